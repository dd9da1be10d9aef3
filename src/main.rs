//! Command-line interface for docdb-loadtest
//!
//! # Usage
//!
//! ```bash
//! # Run with ./config.yaml
//! docdb-loadtest
//!
//! # Run with an explicit configuration file and debug logging
//! RUST_LOG=debug docdb-loadtest -f bench/docdb.yaml
//! ```
//!
//! ## Configuration
//! ```yaml
//! caFilePath: rds-combined-ca-bundle.pem
//! username: bench
//! password: secret
//! clusterEndpoint: docdb.cluster.example.com:27017
//! readPreference: secondaryPreferred
//! collectionName: orders
//! connectTimeout: 10
//! queryTimeout: 5
//! threadNumber: 8
//! insertNumber: 1000
//! jsonFileName: payload.json
//! ```

use clap::Parser;
use docdb_loadtest::run_benchmark;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docdb-loadtest")]
#[command(about = "Concurrent insert benchmark for TLS-secured MongoDB-compatible clusters")]
#[command(version)]
struct Cli {
    /// Path to the YAML run configuration
    #[arg(short = 'f', long = "config", default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let report = run_benchmark(&cli.config).await?;
    println!("total time: {:?}", report.duration);

    Ok(())
}
