//! Per-worker insert loop.

use crate::error::BenchError;
use crate::payload::Payload;
use crate::session::Session;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Parameters of one worker's insert loop.
#[derive(Debug, Clone, Copy)]
pub struct InsertLoop<'a> {
    /// Worker index, used to label errors and log lines
    pub worker: usize,
    pub collection: &'a str,
    /// Number of sequential inserts
    pub count: u64,
    /// Deadline applied to each insert separately
    pub query_timeout: Duration,
    /// Incremented after every successful insert
    pub progress: &'a AtomicU64,
    pub cancel: &'a CancellationToken,
}

/// Perform `plan.count` sequential inserts of `payload` on `session`.
///
/// Each insert gets a fresh `query_timeout` deadline. The first failure ends
/// the loop and is returned as is; nothing is retried. Returns the number of
/// inserts performed, which on success always equals `plan.count`.
pub async fn run_inserts<S>(
    session: &S,
    payload: &Payload,
    plan: &InsertLoop<'_>,
) -> Result<u64, BenchError>
where
    S: Session + ?Sized,
{
    for index in 0..plan.count {
        let insert = tokio::time::timeout(
            plan.query_timeout,
            session.insert(plan.collection, payload, plan.worker, index),
        );

        let outcome = tokio::select! {
            biased;
            _ = plan.cancel.cancelled() => {
                return Err(BenchError::Cancelled { worker: plan.worker });
            }
            outcome = insert => outcome,
        };

        match outcome {
            Ok(Ok(())) => {
                plan.progress.fetch_add(1, Ordering::Relaxed);
                trace!(worker = plan.worker, index, "insert ok");
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(BenchError::InsertTimeout {
                    worker: plan.worker,
                    index,
                    timeout: plan.query_timeout,
                })
            }
        }
    }

    Ok(plan.count)
}
