use omega_controller::{OperationalState, Response};
use omega_devkit::{OperationBuilder, TestHarness};
use serde_json::json;

#[tokio::test]
async fn scan_scenarios() {
    let harness = TestHarness::fast();
    harness.activate().unwrap();

    let high = harness.controller.process_operation(&OperationBuilder::scan("OP1", "HIGH"));
    let value = serde_json::to_value(&high).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["operation_id"], "OP1");
    assert_eq!(value["threat_level"], 3);
    assert_eq!(value["status"], "PROCESSED");
    assert!(value["timestamp"].as_str().is_some_and(|ts| !ts.is_empty()));
    assert_eq!(harness.controller.metrics().threats_neutralized, 1);

    let low = harness.controller.process_operation(&OperationBuilder::scan("OP2", "LOW"));
    assert_eq!(low.threat_level(), Some(1));
    assert_eq!(harness.controller.metrics().threats_neutralized, 1);

    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn malformed_operations_count_as_errors() {
    let harness = TestHarness::fast();
    harness.activate().unwrap();

    for (i, op) in OperationBuilder::malformed().iter().enumerate() {
        let response = harness.controller.process_operation(op);
        assert_eq!(
            response,
            Response::Rejected {
                success: false,
                error: "Invalid operation".into()
            }
        );
        let metrics = harness.controller.metrics();
        assert_eq!(metrics.errors_count, i as u64 + 1);
        assert_eq!(metrics.processed_operations, 0);
    }

    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn payload_contents_are_not_inspected() {
    let harness = TestHarness::fast();
    harness.activate().unwrap();

    for payload in [json!(null), json!("raw"), json!([1, 2, 3]), json!({"nested": {"deep": true}})] {
        let op = OperationBuilder::new().priority("CRITICAL").payload(payload).build();
        let response = harness.controller.process_operation(&op);
        assert_eq!(response.threat_level(), Some(4));
        assert_eq!(response.operation_id(), Some("UNKNOWN"));
    }

    harness.controller.stop().await.unwrap();
}

#[tokio::test]
async fn inactive_controller_is_idempotent() {
    let harness = TestHarness::fast();
    let op = OperationBuilder::scan("OP1", "HIGH");

    for _ in 0..3 {
        assert_eq!(harness.controller.process_operation(&op).error(), Some("Controller not active"));
    }
    harness.controller.initialize().unwrap();
    assert_eq!(harness.controller.state(), OperationalState::Ready);
    assert_eq!(harness.controller.process_operation(&op).error(), Some("Controller not active"));

    let metrics = harness.controller.metrics();
    assert_eq!(metrics.errors_count, 0);
    assert_eq!(metrics.processed_operations, 0);
}
