//! A worker's exclusive session on the cluster.

use crate::handshake::{certificate_rejection, HandshakeWatch};
use async_trait::async_trait;
use bson::doc;
use loadtest_core::{BenchError, Payload, Session};
use mongodb::error::{Error, ErrorKind};
use mongodb::{Client, Database};
use serde_json::Value;
use std::time::Duration;

/// Client plus target database, owned by one worker.
pub struct MongoSession {
    client: Client,
    database: Database,
    worker: usize,
    connect_timeout: Duration,
    handshake: HandshakeWatch,
}

impl MongoSession {
    pub fn new(
        client: Client,
        database_name: &str,
        worker: usize,
        connect_timeout: Duration,
        handshake: HandshakeWatch,
    ) -> Self {
        let database = client.database(database_name);
        Self {
            client,
            database,
            worker,
            connect_timeout,
            handshake,
        }
    }

    /// Classify a failed ping.
    ///
    /// Server selection running out of time is a timeout unless one of the
    /// servers rejected the handshake on certificate grounds.
    fn ping_error(&self, error: Error) -> BenchError {
        if let ErrorKind::ServerSelection { .. } = error.kind.as_ref() {
            if certificate_rejection(&error).is_none() {
                return BenchError::ConnectTimeout {
                    worker: self.worker,
                    timeout: self.connect_timeout,
                };
            }
        }
        BenchError::connect(self.worker, error)
    }
}

#[async_trait]
impl Session for MongoSession {
    async fn ping(&self) -> Result<(), BenchError> {
        let admin = self.client.database("admin");
        let ping = async { admin.run_command(doc! { "ping": 1 }).await };

        tokio::select! {
            result = ping => {
                result.map_err(|e| self.ping_error(e))?;
            }
            reason = self.handshake.rejected() => {
                return Err(BenchError::connect(
                    self.worker,
                    format!("TLS handshake rejected by {reason}"),
                ));
            }
        }
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        payload: &Payload,
        worker: usize,
        index: u64,
    ) -> Result<(), BenchError> {
        // The inserted id is not inspected; only completion matters.
        self.database
            .collection::<Value>(collection)
            .insert_one(payload.value())
            .await
            .map_err(|e| BenchError::insert(worker, index, e))?;
        Ok(())
    }
}
