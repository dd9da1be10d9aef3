//! The JSON document inserted by every operation.

use crate::error::ConfigError;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// A parsed JSON value shared read-only by all workers.
///
/// Cloning is cheap: clones share the same parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    value: Arc<Value>,
}

impl Payload {
    pub fn new(value: Value) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Read and parse the fixture file. The file must hold exactly one JSON value.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value =
            serde_json::from_slice(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(value))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the payload is a JSON object, i.e. can be stored as a document.
    pub fn is_document(&self) -> bool {
        self.value.is_object()
    }
}
