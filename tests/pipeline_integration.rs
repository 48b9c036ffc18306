//! Pipeline integration tests
//!
//! Run the full producer/reader pipeline through the public API with the
//! role count configured for the crate.

use sensorbuf::app::startup::sinks_for_roles;
use sensorbuf::core::retry::PollPolicy;
use sensorbuf::core::shutdown::ShutdownCoordinator;
use sensorbuf::pipeline::*;
use sensorbuf::queue::{QueueConfig, DEFAULT_ROLES};
use std::time::Duration;

fn config(capacity: Option<usize>) -> PipelineConfig {
    let mut queue = QueueConfig::new("integration");
    if let Some(capacity) = capacity {
        queue = queue.with_node_capacity(capacity);
    }
    PipelineConfig {
        queue,
        interval: Duration::ZERO,
        poll: PollPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(8),
            max_attempts: None,
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_default_roles_pipeline_drains_completely() {
    let shutdown = ShutdownCoordinator::new();
    let data = CountingSink::new("data");
    let sinks = sinks_for_roles(data.clone(), DEFAULT_ROLES);

    let report = Pipeline::<DEFAULT_ROLES>::run(
        config(None),
        SimulatedSource::new(vec![15, 21, 37, 49], 400),
        sinks,
        &shutdown,
    )
    .await
    .unwrap();

    assert_eq!(report.produced, 400);
    assert_eq!(report.roles.len(), DEFAULT_ROLES);
    assert!(report.roles.iter().all(|r| r.read == 400));
    assert_eq!(report.final_stats.removed, 400);
    assert_eq!(report.discarded, 0);
    assert_eq!(data.total().unwrap(), 400);
    assert_eq!(data.tallies().unwrap()[&49].count, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tight_capacity_still_delivers_everything() {
    let shutdown = ShutdownCoordinator::new();
    let data = CountingSink::new("data");
    let sinks = sinks_for_roles(data.clone(), DEFAULT_ROLES);

    let report = Pipeline::<DEFAULT_ROLES>::run(
        config(Some(1)),
        SimulatedSource::new(vec![3], 50),
        sinks,
        &shutdown,
    )
    .await
    .unwrap();

    assert_eq!(report.produced, 50);
    assert_eq!(data.total().unwrap(), 50);
    assert!(!report.interrupted);
}

#[tokio::test]
async fn test_empty_source_finishes_immediately() {
    let shutdown = ShutdownCoordinator::new();
    let sinks = sinks_for_roles(CountingSink::new("data"), DEFAULT_ROLES);

    let report = Pipeline::<DEFAULT_ROLES>::run(
        config(None),
        SimulatedSource::new(Vec::new(), 10),
        sinks,
        &shutdown,
    )
    .await
    .unwrap();

    assert_eq!(report.produced, 0);
    assert_eq!(report.final_stats.inserted, 0);
    assert!(report.roles.iter().all(|r| r.read == 0));
}
