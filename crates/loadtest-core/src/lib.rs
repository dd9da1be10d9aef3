//! Core of the concurrent insert benchmark.
//!
//! This crate holds everything that does not depend on a particular
//! database driver:
//!
//! - [`RunConfig`] - Immutable description of one benchmark run, loaded from YAML
//! - [`Payload`] - The JSON document inserted by every operation
//! - [`Connector`] / [`Session`] - The seam a database driver implements
//! - [`run_inserts`] - The per-worker insert loop with a fresh deadline per operation
//! - [`BenchmarkCoordinator`] - Spawns the workers and aggregates their results
//! - [`RunReport`] / [`RunAborted`] - The outcome of a run
//!
//! # Architecture
//!
//! ```text
//! loadtest-core (this crate)
//!    │
//!    ├─── loadtest-insert-mongodb  (implements Connector/Session over the mongodb driver)
//!    │
//!    └─── docdb-loadtest           (CLI: loads config, builds connector, runs coordinator)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let config = Arc::new(RunConfig::from_file("config.yaml")?);
//! let payload = Payload::from_file(&config.json_file_name)?;
//! let mut coordinator = BenchmarkCoordinator::new(config, connector);
//! let report = coordinator.execute(payload).await?;
//! println!("total time: {:?}", report.duration);
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod logging;
pub mod payload;
pub mod report;
pub mod session;

pub use config::{ReadPreference, RunConfig};
pub use coordinator::{BenchmarkCoordinator, RunState};
pub use error::{BenchError, ConfigError};
pub use executor::{run_inserts, InsertLoop};
pub use logging::mask_connection_password;
pub use payload::Payload;
pub use report::{RunAborted, RunReport, WorkerOutcome};
pub use session::{Connector, Session};
