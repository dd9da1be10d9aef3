//! The seam between the coordinator and a database driver.

use crate::error::BenchError;
use crate::payload::Payload;
use async_trait::async_trait;

/// An authenticated, transport-secured handle owned by exactly one worker.
#[async_trait]
pub trait Session: Send + Sync {
    /// Round-trip ping proving the cluster answers on this session.
    async fn ping(&self) -> Result<(), BenchError>;

    /// Insert one copy of `payload` into `collection`.
    ///
    /// `worker` and `index` only label the error; implementations must not
    /// retry.
    async fn insert(
        &self,
        collection: &str,
        payload: &Payload,
        worker: usize,
        index: u64,
    ) -> Result<(), BenchError>;
}

/// Builds one fresh session per worker.
///
/// The coordinator enforces the connect deadline around `connect` and the
/// first `ping`, so implementations do not need their own timer.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Session: Session + 'static;

    async fn connect(&self, worker: usize) -> Result<Self::Session, BenchError>;
}
