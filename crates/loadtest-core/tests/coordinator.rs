mod common;

use common::{config, Behavior, MockConnector};
use loadtest_core::{BenchError, BenchmarkCoordinator, Payload, RunState};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn payload() -> Payload {
    Payload::new(json!({"sku": "A-100", "qty": 3}))
}

#[tokio::test]
async fn test_successful_run_performs_every_insert() {
    let (connector, stats) = MockConnector::new(Behavior::default());
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(4, 25)), connector);
    assert_eq!(coordinator.state(), RunState::NotStarted);

    let report = coordinator.execute(payload()).await.unwrap();

    assert_eq!(coordinator.state(), RunState::Finished);
    assert_eq!(report.workers, 4);
    assert_eq!(report.inserts_per_worker, 25);
    assert_eq!(report.total_inserts, 100);
    assert_eq!(stats.total_inserts(), 100);
    for worker in 0..4 {
        assert_eq!(stats.inserts_for(worker), 25);
    }
    assert_eq!(stats.connects.load(Ordering::SeqCst), 4);
    assert_eq!(stats.pings.load(Ordering::SeqCst), 4);
    assert_eq!(*stats.collections.lock().unwrap(), vec!["bench_docs".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_single_insert_run_does_no_extra_work() {
    let behavior = Behavior {
        insert_latency: Some(Duration::from_millis(250)),
        ..Default::default()
    };
    let (connector, stats) = MockConnector::new(behavior);
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(1, 1)), connector);

    let report = coordinator.execute(payload()).await.unwrap();

    assert_eq!(stats.connects.load(Ordering::SeqCst), 1);
    assert_eq!(stats.pings.load(Ordering::SeqCst), 1);
    assert_eq!(stats.attempts_for(0), 1);
    assert_eq!(report.total_inserts, 1);
    assert!(report.duration >= Duration::from_millis(250));
    assert!(report.duration < Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_endpoint_times_out_at_connect_deadline() {
    let behavior = Behavior {
        hang_connect: true,
        ..Default::default()
    };
    let (connector, stats) = MockConnector::new(behavior);
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(2, 10)), connector);

    let aborted = coordinator.execute(payload()).await.unwrap_err();

    assert_eq!(coordinator.state(), RunState::Aborted);
    match aborted.cause {
        BenchError::ConnectTimeout { timeout, .. } => {
            assert_eq!(timeout, Duration::from_secs(3));
        }
        other => panic!("expected connect timeout, got {other:?}"),
    }
    assert!(aborted.elapsed >= Duration::from_secs(3));
    assert!(aborted.elapsed < Duration::from_secs(4));
    assert_eq!(aborted.inserts_completed, 0);
    assert_eq!(stats.total_inserts(), 0);
}

#[tokio::test]
async fn test_rejected_ping_is_connect_error() {
    let behavior = Behavior {
        reject_ping: true,
        ..Default::default()
    };
    let (connector, stats) = MockConnector::new(behavior);
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(3, 5)), connector);

    let aborted = coordinator.execute(payload()).await.unwrap_err();

    assert!(matches!(aborted.cause, BenchError::Connect { .. }));
    assert_eq!(aborted.cause.phase(), "connect");
    assert_eq!(aborted.workers_completed, 0);
    assert!(stats.attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_inserts_abort_after_first_failure() {
    let behavior = Behavior {
        reject_all_inserts: true,
        ..Default::default()
    };
    let (connector, stats) = MockConnector::new(behavior);
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(3, 50)), connector);

    let aborted = coordinator.execute(payload()).await.unwrap_err();

    assert!(matches!(aborted.cause, BenchError::Insert { index: 0, .. }));
    assert_eq!(aborted.cause.operation_index(), Some(0));
    assert_eq!(aborted.inserts_completed, 0);
    for worker in 0..3 {
        assert!(stats.attempts_for(worker) < 50);
        assert!(stats.attempts_for(worker) <= 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_one_failing_worker_cancels_siblings() {
    let behavior = Behavior {
        reject_inserts: Some((1, 5)),
        insert_latency: Some(Duration::from_millis(10)),
        ..Default::default()
    };
    let (connector, stats) = MockConnector::new(behavior);
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(4, 1_000)), connector);

    let aborted = coordinator.execute(payload()).await.unwrap_err();

    match aborted.cause {
        BenchError::Insert { worker, index, .. } => {
            assert_eq!(worker, 1);
            assert_eq!(index, 5);
        }
        other => panic!("expected insert error, got {other:?}"),
    }
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(aborted.workers_completed, 0);
    assert_eq!(stats.inserts_for(1), 5);
    assert_eq!(aborted.inserts_completed, stats.total_inserts());
    for worker in [0, 2, 3] {
        assert!(stats.inserts_for(worker) < 1_000);
    }
}

#[tokio::test]
async fn test_invalid_config_fails_before_any_connect() {
    let (connector, stats) = MockConnector::new(Behavior::default());
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(0, 10)), connector);

    let aborted = coordinator.execute(payload()).await.unwrap_err();

    assert!(matches!(aborted.cause, BenchError::Config(_)));
    assert_eq!(stats.connects.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.state(), RunState::Aborted);
}

#[tokio::test]
async fn test_coordinator_runs_only_once() {
    let (connector, stats) = MockConnector::new(Behavior::default());
    let mut coordinator = BenchmarkCoordinator::new(Arc::new(config(2, 3)), connector);

    coordinator.execute(payload()).await.unwrap();
    let second = coordinator.execute(payload()).await.unwrap_err();

    assert!(matches!(second.cause, BenchError::Config(_)));
    assert_eq!(stats.connects.load(Ordering::SeqCst), 2);
    assert_eq!(coordinator.state(), RunState::Finished);
}
