//! Run configuration loaded from YAML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read-preference tags accepted by a replica-set cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl ReadPreference {
    /// The tag as it appears in a connection string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadPreference::Primary => "primary",
            ReadPreference::PrimaryPreferred => "primaryPreferred",
            ReadPreference::Secondary => "secondary",
            ReadPreference::SecondaryPreferred => "secondaryPreferred",
            ReadPreference::Nearest => "nearest",
        }
    }
}

impl fmt::Display for ReadPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(ReadPreference::Primary),
            "primaryPreferred" => Ok(ReadPreference::PrimaryPreferred),
            "secondary" => Ok(ReadPreference::Secondary),
            "secondaryPreferred" => Ok(ReadPreference::SecondaryPreferred),
            "nearest" => Ok(ReadPreference::Nearest),
            _ => Err(ConfigError::Invalid(format!("Unknown read preference: {s}"))),
        }
    }
}

fn default_auth_database() -> String {
    "sample-database".to_string()
}

fn default_database_name() -> String {
    "test".to_string()
}

fn default_replica_set() -> String {
    "rs0".to_string()
}

/// Immutable description of one benchmark run.
///
/// Field names follow the camelCase keys of the YAML file. Timeouts are
/// whole seconds.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// PEM bundle with the cluster's certificate authority
    pub ca_file_path: PathBuf,
    pub username: String,
    pub password: String,
    /// host[:port] of the cluster
    pub cluster_endpoint: String,
    pub read_preference: ReadPreference,
    /// Collection every insert targets
    pub collection_name: String,
    /// Deadline in seconds for connect plus liveness ping
    pub connect_timeout: u64,
    /// Deadline in seconds for each single insert
    pub query_timeout: u64,
    /// Number of concurrent workers
    pub thread_number: usize,
    /// Inserts performed by each worker
    pub insert_number: u64,
    /// JSON fixture inserted by every operation
    pub json_file_name: PathBuf,
    /// Database the credentials authenticate against
    #[serde(default = "default_auth_database")]
    pub auth_database: String,
    /// Database holding the target collection
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_replica_set")]
    pub replica_set: String,
}

impl RunConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants a run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_number == 0 {
            return Err(ConfigError::Invalid(
                "threadNumber must be a positive integer".into(),
            ));
        }
        if self.insert_number == 0 {
            return Err(ConfigError::Invalid(
                "insertNumber must be a positive integer".into(),
            ));
        }
        if self.connect_timeout == 0 {
            return Err(ConfigError::Invalid(
                "connectTimeout must be a positive number of seconds".into(),
            ));
        }
        if self.query_timeout == 0 {
            return Err(ConfigError::Invalid(
                "queryTimeout must be a positive number of seconds".into(),
            ));
        }
        let required = [
            ("username", self.username.as_str()),
            ("clusterEndpoint", self.cluster_endpoint.as_str()),
            ("collectionName", self.collection_name.as_str()),
            ("databaseName", self.database_name.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }
        if self.ca_file_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("caFilePath must not be empty".into()));
        }
        if self.json_file_name.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "jsonFileName must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Total inserts a fully successful run performs.
    pub fn total_inserts(&self) -> u64 {
        self.thread_number as u64 * self.insert_number
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("ca_file_path", &self.ca_file_path)
            .field("username", &self.username)
            .field("password", &"***")
            .field("cluster_endpoint", &self.cluster_endpoint)
            .field("read_preference", &self.read_preference)
            .field("collection_name", &self.collection_name)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("thread_number", &self.thread_number)
            .field("insert_number", &self.insert_number)
            .field("json_file_name", &self.json_file_name)
            .field("auth_database", &self.auth_database)
            .field("database_name", &self.database_name)
            .field("replica_set", &self.replica_set)
            .finish()
    }
}
