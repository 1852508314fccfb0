/*!
Operation builders

Produce requests shaped like the ones the deployment sends, including the
malformed variants the validation rules have to reject.
*/

use omega_controller::Operation;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct OperationBuilder {
    op: Operation,
}

impl OperationBuilder {
    /// A complete operation: type `SCAN`, priority `LOW`, empty object payload.
    pub fn new() -> Self {
        Self {
            op: Operation {
                id: None,
                op_type: Some("SCAN".to_string()),
                priority: Some("LOW".to_string()),
                payload: Some(json!({})),
            },
        }
    }

    /// Shortcut for the common `{id, type: SCAN, priority, payload: {}}` request.
    pub fn scan(id: &str, priority: &str) -> Operation {
        Self::new().id(id).priority(priority).build()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.op.id = Some(id.into());
        self
    }

    pub fn op_type(mut self, op_type: impl Into<String>) -> Self {
        self.op.op_type = Some(op_type.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.op.priority = Some(priority.into());
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.op.payload = Some(payload);
        self
    }

    pub fn without_type(mut self) -> Self {
        self.op.op_type = None;
        self
    }

    pub fn without_priority(mut self) -> Self {
        self.op.priority = None;
        self
    }

    pub fn without_payload(mut self) -> Self {
        self.op.payload = None;
        self
    }

    pub fn build(self) -> Operation {
        self.op
    }

    /// One operation per missing required field.
    pub fn malformed() -> Vec<Operation> {
        vec![
            Self::new().without_type().build(),
            Self::new().without_priority().build(),
            Self::new().without_payload().build(),
        ]
    }
}

impl Default for OperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
