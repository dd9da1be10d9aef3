//! Worker-pool coordinator for a benchmark run.

use crate::config::RunConfig;
use crate::error::{BenchError, ConfigError};
use crate::executor::{run_inserts, InsertLoop};
use crate::payload::Payload;
use crate::report::{RunAborted, RunReport, WorkerOutcome};
use crate::session::{Connector, Session};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Lifecycle of a coordinator. `Finished` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Dispatching,
    AwaitingCompletion,
    Finished,
    Aborted,
}

/// Spawns `threadNumber` workers, each connecting its own session and
/// performing `insertNumber` inserts, and aggregates their results.
///
/// The first error from any worker aborts the whole run: siblings are
/// cancelled and no partial report is produced.
pub struct BenchmarkCoordinator<C: Connector> {
    config: Arc<RunConfig>,
    connector: Arc<C>,
    state: RunState,
}

impl<C: Connector> BenchmarkCoordinator<C> {
    pub fn new(config: Arc<RunConfig>, connector: C) -> Self {
        Self {
            config,
            connector: Arc::new(connector),
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the benchmark once.
    ///
    /// The returned duration spans from just before the first worker is
    /// spawned to the moment the last worker reports completion.
    pub async fn execute(&mut self, payload: Payload) -> Result<RunReport, RunAborted> {
        if self.state != RunState::NotStarted {
            return Err(not_dispatched(ConfigError::Invalid(format!(
                "coordinator already ran (state: {:?})",
                self.state
            ))));
        }
        if let Err(e) = self.config.validate() {
            self.state = RunState::Aborted;
            return Err(not_dispatched(e));
        }

        let workers = self.config.thread_number;
        let progress = Arc::new(AtomicU64::new(0));
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        info!(
            "Dispatching {} workers x {} inserts into '{}'",
            workers, self.config.insert_number, self.config.collection_name
        );

        self.state = RunState::Dispatching;
        let start = Instant::now();
        for worker in 0..workers {
            tasks.spawn(run_worker(
                worker,
                Arc::clone(&self.connector),
                Arc::clone(&self.config),
                payload.clone(),
                Arc::clone(&progress),
                cancel.clone(),
            ));
        }
        self.state = RunState::AwaitingCompletion;

        let mut workers_completed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match flatten(joined) {
                Ok(outcome) => {
                    workers_completed += 1;
                    debug!(
                        worker = outcome.worker,
                        "Worker finished {} inserts ({}/{} workers done)",
                        outcome.inserts,
                        workers_completed,
                        workers
                    );
                }
                Err(cause) => {
                    let elapsed = start.elapsed();
                    error!(phase = cause.phase(), "Run aborted: {}", cause);
                    cancel.cancel();
                    tasks.abort_all();
                    // Siblings that finished while the abort propagated still count.
                    while let Some(joined) = tasks.join_next().await {
                        if flatten(joined).is_ok() {
                            workers_completed += 1;
                        }
                    }
                    self.state = RunState::Aborted;
                    return Err(RunAborted {
                        cause,
                        workers_completed,
                        inserts_completed: progress.load(Ordering::Relaxed),
                        elapsed,
                    });
                }
            }
        }

        let duration = start.elapsed();
        self.state = RunState::Finished;

        let report = RunReport {
            duration,
            workers,
            inserts_per_worker: self.config.insert_number,
            total_inserts: progress.load(Ordering::Relaxed),
        };
        info!(
            "Run complete: {} inserts in {:?} ({:.2} inserts/sec)",
            report.total_inserts,
            report.duration,
            report.inserts_per_second()
        );
        Ok(report)
    }
}

fn not_dispatched(err: ConfigError) -> RunAborted {
    RunAborted {
        cause: err.into(),
        workers_completed: 0,
        inserts_completed: 0,
        elapsed: Duration::ZERO,
    }
}

fn flatten(
    joined: Result<Result<WorkerOutcome, BenchError>, tokio::task::JoinError>,
) -> Result<WorkerOutcome, BenchError> {
    joined.map_err(|e| BenchError::WorkerPanicked(e.to_string()))?
}

/// One worker: connect and ping under the connect deadline, then run the
/// insert loop.
async fn run_worker<C: Connector>(
    worker: usize,
    connector: Arc<C>,
    config: Arc<RunConfig>,
    payload: Payload,
    progress: Arc<AtomicU64>,
    cancel: CancellationToken,
) -> Result<WorkerOutcome, BenchError> {
    info!(worker, "Starting worker");

    let connect_timeout = config.connect_timeout();
    let connect = async {
        let session = connector.connect(worker).await?;
        session.ping().await?;
        Ok::<_, BenchError>(session)
    };

    let session = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(BenchError::Cancelled { worker }),
        connected = tokio::time::timeout(connect_timeout, connect) => match connected {
            Ok(session) => session?,
            Err(_) => {
                return Err(BenchError::ConnectTimeout {
                    worker,
                    timeout: connect_timeout,
                })
            }
        },
    };
    info!(worker, "Connected to cluster");

    let plan = InsertLoop {
        worker,
        collection: &config.collection_name,
        count: config.insert_number,
        query_timeout: config.query_timeout(),
        progress: &progress,
        cancel: &cancel,
    };
    let inserts = run_inserts(&session, &payload, &plan).await?;

    Ok(WorkerOutcome { worker, inserts })
}
