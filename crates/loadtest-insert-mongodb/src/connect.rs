//! Connection options and per-worker client construction.

use crate::handshake::HandshakeWatch;
use crate::session::MongoSession;
use crate::trust::TrustConfig;
use async_trait::async_trait;
use loadtest_core::{mask_connection_password, BenchError, ConfigError, Connector, RunConfig};
use mongodb::options::{ClientOptions, Credential, Tls, TlsOptions};
use mongodb::Client;
use std::time::Duration;
use tracing::debug;

/// Application name reported to the cluster in the handshake.
pub const APP_NAME: &str = "docdb-loadtest";

/// Locator for the cluster, without credentials.
///
/// Credentials are attached to the parsed options instead of the string so
/// that user names and passwords need no percent-encoding.
pub fn connection_string(config: &RunConfig) -> String {
    format!(
        "mongodb://{}/{}?tls=true&replicaSet={}&readPreference={}",
        config.cluster_endpoint, config.auth_database, config.replica_set, config.read_preference
    )
}

/// The full credentialed locator with the password masked, for log lines.
pub fn redacted_connection_string(config: &RunConfig) -> String {
    let locator = connection_string(config);
    let authority = locator.trim_start_matches("mongodb://");
    mask_connection_password(&format!(
        "mongodb://{}:{}@{}",
        config.username, config.password, authority
    ))
}

/// Build driver options: locator, credentials, TLS trust and timeouts.
pub async fn client_options(
    config: &RunConfig,
    trust: &TrustConfig,
) -> Result<ClientOptions, BenchError> {
    let uri = connection_string(config);
    let mut options = ClientOptions::parse(uri.as_str()).await.map_err(|e| {
        ConfigError::Invalid(format!("Invalid cluster locator {uri}: {e}"))
    })?;

    let mut credential = Credential::default();
    credential.username = Some(config.username.clone());
    credential.password = Some(config.password.clone());
    credential.source = Some(config.auth_database.clone());
    options.credential = Some(credential);

    let mut tls = TlsOptions::default();
    tls.ca_file_path = Some(trust.ca_file_path().to_path_buf());
    options.tls = Some(Tls::Enabled(tls));

    options.connect_timeout = Some(config.connect_timeout());
    options.server_selection_timeout = Some(config.connect_timeout());
    // A failed insert must fail the run, not be replayed by the driver.
    options.retry_writes = Some(false);
    options.app_name = Some(APP_NAME.to_string());

    Ok(options)
}

/// Make aws-lc-rs the process-wide rustls provider unless one is already set.
///
/// The driver builds its TLS config through the default provider, which is
/// ambiguous when more than one provider feature is compiled in.
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Losing a race to another installer is fine; a provider is set either way.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }
}

/// Hands every worker its own client built from shared options.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    options: ClientOptions,
    database_name: String,
    connect_timeout: Duration,
}

impl MongoConnector {
    pub async fn new(config: &RunConfig, trust: &TrustConfig) -> Result<Self, BenchError> {
        install_crypto_provider();
        let options = client_options(config, trust).await?;
        debug!(
            "Prepared client options for {}",
            redacted_connection_string(config)
        );
        Ok(Self {
            options,
            database_name: config.database_name.clone(),
            connect_timeout: config.connect_timeout(),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Session = MongoSession;

    async fn connect(&self, worker: usize) -> Result<MongoSession, BenchError> {
        let handshake = HandshakeWatch::new();
        let mut options = self.options.clone();
        options.sdam_event_handler = Some(handshake.event_handler());

        let client = Client::with_options(options).map_err(|e| BenchError::connect(worker, e))?;
        debug!(worker, "Created client for database '{}'", self.database_name);
        Ok(MongoSession::new(
            client,
            &self.database_name,
            worker,
            self.connect_timeout,
            handshake,
        ))
    }
}
