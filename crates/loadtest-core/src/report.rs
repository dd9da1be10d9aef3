//! Outcome of a benchmark run.

use crate::error::BenchError;
use std::time::Duration;
use thiserror::Error;

/// What a worker reports after finishing all of its inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub worker: usize,
    pub inserts: u64,
}

/// Aggregate result of a fully successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Wall-clock time from dispatch of the first worker to completion of the last.
    pub duration: Duration,
    pub workers: usize,
    pub inserts_per_worker: u64,
    pub total_inserts: u64,
}

impl RunReport {
    /// Calculate inserts per second over the whole run.
    pub fn inserts_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total_inserts as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// A run stopped by its first fatal error.
///
/// Besides the error itself this records how far the run got, so callers can
/// inspect partial progress instead of only seeing the failure.
#[derive(Error, Debug)]
#[error("Benchmark aborted after {inserts_completed} successful inserts ({workers_completed} workers finished)")]
pub struct RunAborted {
    #[source]
    pub cause: BenchError,
    /// Workers that had finished all of their inserts before the abort.
    pub workers_completed: usize,
    /// Successful inserts across all workers before the abort.
    pub inserts_completed: u64,
    /// Time from dispatch until the failure was observed.
    pub elapsed: Duration,
}
