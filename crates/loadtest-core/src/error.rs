//! Error types for the insert benchmark.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed driver error carried by connect and insert failures.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while loading the configuration or the payload fixture.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file named by the configuration could not be read.
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML or misses a required field.
    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The payload fixture is not a single valid JSON value.
    #[error("Failed to parse JSON payload {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field parsed but holds a value the benchmark cannot run with.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can stop a benchmark run.
///
/// Every variant is fatal: the coordinator never retries and never keeps
/// going after one of these surfaces from any worker.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Bad or missing configuration, payload or CA file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The CA bundle holds no usable PEM certificate.
    #[error("Failed to build trust store from {path:?}: {reason}")]
    TrustParse { path: PathBuf, reason: String },

    /// Connection plus liveness ping did not finish before the connect deadline.
    #[error("Worker {worker}: connecting to cluster timed out after {timeout:?}")]
    ConnectTimeout { worker: usize, timeout: Duration },

    /// The cluster rejected the session or the liveness ping.
    #[error("Worker {worker}: failed to connect to cluster: {source}")]
    Connect {
        worker: usize,
        #[source]
        source: DriverError,
    },

    /// A single insert did not complete before its deadline.
    #[error("Worker {worker}: insert #{index} timed out after {timeout:?}")]
    InsertTimeout {
        worker: usize,
        index: u64,
        timeout: Duration,
    },

    /// The cluster rejected a single insert.
    #[error("Worker {worker}: insert #{index} failed: {source}")]
    Insert {
        worker: usize,
        index: u64,
        #[source]
        source: DriverError,
    },

    /// The worker stopped because a sibling already failed the run.
    #[error("Worker {worker}: cancelled")]
    Cancelled { worker: usize },

    /// The worker task panicked or was torn down by the runtime.
    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),
}

impl BenchError {
    /// Wrap any driver error as a connect-phase failure.
    pub fn connect<E>(worker: usize, err: E) -> Self
    where
        E: Into<DriverError>,
    {
        BenchError::Connect {
            worker,
            source: err.into(),
        }
    }

    /// Wrap any driver error as the failure of insert `index`.
    pub fn insert<E>(worker: usize, index: u64, err: E) -> Self
    where
        E: Into<DriverError>,
    {
        BenchError::Insert {
            worker,
            index,
            source: err.into(),
        }
    }

    /// Name of the phase that failed, used to label log lines.
    pub fn phase(&self) -> &'static str {
        match self {
            BenchError::Config(_) => "config",
            BenchError::TrustParse { .. } => "trust-store",
            BenchError::ConnectTimeout { .. } | BenchError::Connect { .. } => "connect",
            BenchError::InsertTimeout { .. } | BenchError::Insert { .. } => "insert",
            BenchError::Cancelled { .. } => "cancelled",
            BenchError::WorkerPanicked(_) => "worker",
        }
    }

    /// Index of the failing operation, for insert-phase errors.
    pub fn operation_index(&self) -> Option<u64> {
        match self {
            BenchError::InsertTimeout { index, .. } | BenchError::Insert { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}
