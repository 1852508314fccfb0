use omega_controller::{ControllerConfig, OperationalState::*};
use omega_devkit::{fast_config, OperationBuilder, TestHarness};
use std::time::{Duration, Instant};

/// Any measurable latency exceeds this threshold, so the next health tick recovers.
fn hair_trigger_config() -> ControllerConfig {
    ControllerConfig {
        max_response_time_ms: 1e-9,
        ..fast_config()
    }
}

#[tokio::test]
async fn sync_loop_reaches_peers_periodically() {
    let harness = TestHarness::fast();
    harness.activate().unwrap();

    assert!(harness.wait_until(2_000, |h| h.peer.calls() >= 3).await);
    harness.controller.stop().await.unwrap();

    let calls = harness.peer.calls();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.peer.calls(), calls, "sync loop kept running after stop");
}

#[tokio::test]
async fn sync_failures_do_not_stop_the_loop() {
    let harness = TestHarness::fast();
    harness.peer.set_failing(true);
    harness.activate().unwrap();

    assert!(harness.wait_until(2_000, |h| h.peer.calls() >= 3).await);
    assert_eq!(harness.controller.state(), Active);
    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn unavailable_peer_is_skipped() {
    let harness = TestHarness::fast();
    harness.peer.set_available(false);
    harness.activate().unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(harness.peer.calls(), 0);
    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn slow_operation_triggers_auto_recovery() {
    let harness = TestHarness::new(hair_trigger_config());
    harness.activate().unwrap();

    let response = harness.controller.process_operation(&OperationBuilder::scan("OP1", "HIGH"));
    assert!(response.is_success());

    assert!(harness.wait_until(2_000, |h| h.links.attempts() >= 2).await);
    assert!(harness.wait_for_state(Active, 1_000).await);
    harness
        .assert_path(&[(Active, Degraded), (Degraded, Active)])
        .unwrap();
    assert_eq!(harness.controller.metrics().response_time_ms, 0.0);

    harness.controller.stop().await.unwrap();
    assert_eq!(harness.controller.state(), Offline);
}

#[tokio::test]
async fn failed_recovery_is_terminal() {
    let harness = TestHarness::new(hair_trigger_config());
    harness.activate().unwrap();
    harness.links.set_failing(true);

    harness.controller.process_operation(&OperationBuilder::scan("OP1", "LOW"));
    assert!(harness.wait_for_state(Failed, 2_000).await);
    harness
        .assert_path(&[(Active, Degraded), (Degraded, Failed)])
        .unwrap();

    // The health loop keeps running but never leaves FAILED on its own.
    harness.links.set_failing(false);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.controller.state(), Failed);
    assert_eq!(
        harness.controller.process_operation(&OperationBuilder::scan("OP2", "LOW")).error(),
        Some("Controller not active")
    );

    // Loops are stopped, the refusal to go OFFLINE from FAILED is reported.
    assert!(harness.controller.stop().await.is_err());
    assert!(!harness.controller.is_running());
    assert_eq!(harness.controller.state(), Failed);

    // Explicit re-initialization is the only way out.
    harness.activate().unwrap();
    assert_eq!(harness.controller.state(), Active);
    harness.assert_path(&[(Failed, Initializing)]).unwrap();
    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn restart_after_failure_replaces_running_loops() {
    let harness = TestHarness::new(hair_trigger_config());
    harness.activate().unwrap();
    harness.links.set_failing(true);

    harness.controller.process_operation(&OperationBuilder::scan("OP1", "LOW"));
    assert!(harness.wait_for_state(Failed, 2_000).await);
    assert!(harness.controller.is_running());

    // Re-initialize and start again without stopping the loops first.
    harness.links.set_failing(false);
    harness.activate().unwrap();
    assert_eq!(harness.controller.state(), Active);

    harness.controller.stop().await.unwrap();
    assert_eq!(harness.controller.state(), Offline);

    let calls = harness.peer.calls();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(harness.peer.calls(), calls, "sync loop kept running after stop");
}

#[tokio::test]
async fn initialization_failure_then_reinitialize() {
    let harness = TestHarness::fast();
    harness.links.set_failing(true);

    assert!(harness.controller.initialize().is_err());
    assert_eq!(harness.controller.state(), Failed);

    harness.links.set_failing(false);
    harness.controller.initialize().unwrap();
    assert_eq!(harness.controller.state(), Ready);
}

#[tokio::test]
async fn accuracy_is_refreshed_by_health_loop() {
    let harness = TestHarness::fast();
    harness.activate().unwrap();

    for i in 0..3 {
        let op = OperationBuilder::scan(&format!("OP{i}"), "MEDIUM");
        assert!(harness.controller.process_operation(&op).is_success());
    }
    let invalid = OperationBuilder::new().without_payload().build();
    assert_eq!(harness.controller.process_operation(&invalid).error(), Some("Invalid operation"));

    assert!(
        harness
            .wait_until(2_000, |h| (h.controller.metrics().accuracy - 2.0 / 3.0).abs() < 1e-9)
            .await
    );
    let metrics = harness.controller.metrics();
    assert_eq!(metrics.processed_operations, 3);
    assert_eq!(metrics.errors_count, 1);
    assert_eq!(metrics.threats_neutralized, 3);

    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn stop_with_sleeping_loops_is_bounded() {
    let harness = TestHarness::new(ControllerConfig {
        sync_interval_seconds: 3_600.0,
        health_check_interval_seconds: 3_600.0,
        shutdown_timeout_seconds: 1.0,
        ..ControllerConfig::default()
    });
    harness.activate().unwrap();

    let started = Instant::now();
    harness.controller.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(harness.controller.state(), Offline);

    // Stopping again is harmless.
    harness.controller.stop().await.unwrap();
}
