//! docdb-loadtest library
//!
//! A synthetic write benchmark for MongoDB-compatible document-database
//! clusters reached over TLS with username/password authentication.
//!
//! # Features
//!
//! - Fixed pool of concurrent workers, each with its own client session
//! - Per-insert deadline, fail-fast on the first error of any worker
//! - Total wall-clock duration and insert throughput for the run
//!
//! # Crates
//!
//! - `loadtest_core` - configuration, coordinator, insert loop, reporting
//! - `loadtest_insert_mongodb` - TLS trust store and MongoDB sessions
//!
//! # CLI Usage
//!
//! ```bash
//! docdb-loadtest -f config.yaml
//! ```

use anyhow::Context;
use loadtest_core::{BenchError, BenchmarkCoordinator, Payload, RunConfig, RunReport};
use loadtest_insert_mongodb::{build_trust_config, redacted_connection_string, MongoConnector};
use std::path::Path;
use std::sync::Arc;

/// Load every input, run the benchmark once and return its report.
///
/// Inputs are loaded in a fixed order (configuration, payload, trust store)
/// and any failure there stops the run before a single connection is opened.
pub async fn run_benchmark(config_path: &Path) -> anyhow::Result<RunReport> {
    let config = RunConfig::from_file(config_path)
        .map_err(BenchError::from)
        .with_context(|| format!("Failed to load configuration from {config_path:?}"))?;
    tracing::info!("Loaded configuration: {:?}", config);

    let payload = Payload::from_file(&config.json_file_name)
        .map_err(BenchError::from)
        .with_context(|| format!("Failed to load payload from {:?}", config.json_file_name))?;

    let trust = build_trust_config(&config.ca_file_path)
        .context("Failed getting TLS configuration")?;
    tracing::debug!(
        "Trust store ready: {} anchors from {:?}",
        trust.anchor_count(),
        trust.ca_file_path()
    );

    let connector = MongoConnector::new(&config, &trust)
        .await
        .context("Failed to prepare cluster connection")?;
    tracing::info!("Target cluster: {}", redacted_connection_string(&config));

    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config), connector);
    let report = coordinator.execute(payload).await?;
    Ok(report)
}
