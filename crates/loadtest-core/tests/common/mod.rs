//! In-memory connector used to drive the coordinator without a cluster.

use async_trait::async_trait;
use loadtest_core::{BenchError, Connector, Payload, RunConfig, Session};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_CONFIG: &str = r#"
caFilePath: ca.pem
username: bench
password: s3cret
clusterEndpoint: localhost:27017
readPreference: primary
collectionName: bench_docs
connectTimeout: 3
queryTimeout: 2
threadNumber: 4
insertNumber: 25
jsonFileName: payload.json
"#;

pub fn config(threads: usize, inserts: u64) -> RunConfig {
    let mut config = RunConfig::from_yaml(BASE_CONFIG).unwrap();
    config.thread_number = threads;
    config.insert_number = inserts;
    config
}

/// How the mock cluster behaves.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    /// `connect` never returns
    pub hang_connect: bool,
    /// The liveness ping is rejected
    pub reject_ping: bool,
    /// Inserts from this worker are rejected starting at this index
    pub reject_inserts: Option<(usize, u64)>,
    /// Reject every insert from every worker
    pub reject_all_inserts: bool,
    /// Simulated latency of each insert
    pub insert_latency: Option<Duration>,
}

/// Counters shared by the connector and every session it hands out.
#[derive(Debug, Default)]
pub struct Stats {
    pub connects: AtomicUsize,
    pub pings: AtomicUsize,
    pub inserts: Mutex<HashMap<usize, u64>>,
    pub attempts: Mutex<HashMap<usize, u64>>,
    pub collections: Mutex<Vec<String>>,
}

impl Stats {
    pub fn inserts_for(&self, worker: usize) -> u64 {
        self.inserts
            .lock()
            .unwrap()
            .get(&worker)
            .copied()
            .unwrap_or(0)
    }

    pub fn attempts_for(&self, worker: usize) -> u64 {
        self.attempts
            .lock()
            .unwrap()
            .get(&worker)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_inserts(&self) -> u64 {
        self.inserts.lock().unwrap().values().sum()
    }
}

pub struct MockConnector {
    pub behavior: Behavior,
    pub stats: Arc<Stats>,
}

impl MockConnector {
    pub fn new(behavior: Behavior) -> (Self, Arc<Stats>) {
        let stats = Arc::new(Stats::default());
        (
            Self {
                behavior,
                stats: Arc::clone(&stats),
            },
            stats,
        )
    }
}

pub struct MockSession {
    worker: usize,
    behavior: Behavior,
    stats: Arc<Stats>,
}

#[async_trait]
impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, worker: usize) -> Result<MockSession, BenchError> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.behavior.hang_connect {
            std::future::pending::<()>().await;
        }
        Ok(MockSession {
            worker,
            behavior: self.behavior.clone(),
            stats: Arc::clone(&self.stats),
        })
    }
}

#[async_trait]
impl Session for MockSession {
    async fn ping(&self) -> Result<(), BenchError> {
        self.stats.pings.fetch_add(1, Ordering::SeqCst);
        if self.behavior.reject_ping {
            return Err(BenchError::connect(self.worker, "authentication failed"));
        }
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        _payload: &Payload,
        worker: usize,
        index: u64,
    ) -> Result<(), BenchError> {
        *self.stats.attempts.lock().unwrap().entry(worker).or_default() += 1;
        if let Some(latency) = self.behavior.insert_latency {
            tokio::time::sleep(latency).await;
        }
        let rejected = self.behavior.reject_all_inserts
            || matches!(self.behavior.reject_inserts, Some((w, from)) if w == worker && index >= from);
        if rejected {
            return Err(BenchError::insert(worker, index, "write rejected by cluster"));
        }
        *self.stats.inserts.lock().unwrap().entry(worker).or_default() += 1;
        let mut collections = self.stats.collections.lock().unwrap();
        if !collections.iter().any(|c| c == collection) {
            collections.push(collection.to_string());
        }
        Ok(())
    }
}
