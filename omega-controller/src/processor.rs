use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::lifecycle::OperationalState;
use crate::models::{now_rfc3339, Operation, Response, ThreatLevel};
use crate::state::ControllerCore;

/// Validates, classifies and answers operations. Stateless: all bookkeeping goes
/// into the locked [`ControllerCore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationProcessor;

impl OperationProcessor {
    /// `type`, `priority` and `payload` must be present. Contents are not inspected.
    pub fn validate(op: &Operation) -> bool {
        op.op_type.is_some() && op.priority.is_some() && op.payload.is_some()
    }

    pub fn assess_threat(op: &Operation) -> ThreatLevel {
        ThreatLevel::from(op.parsed_priority())
    }

    pub fn generate_response(op: &Operation, threat: ThreatLevel) -> Result<Response, ProcessError> {
        let timestamp = now_rfc3339()?;
        Ok(Response::processed(op.id_or_unknown(), threat, timestamp))
    }

    /// `started` is taken by the caller before waiting for the lock, so the
    /// recorded latency includes lock contention.
    pub fn process(&self, core: &mut ControllerCore, started: Instant, op: &Operation) -> Response {
        if !core.state.is(OperationalState::Active) {
            return Response::rejected(&ProcessError::NotActive);
        }

        match Self::classify(core, started, op) {
            Ok(response) => response,
            Err(err) => {
                core.metrics.record_error();
                warn!(operation_id = op.id_or_unknown(), error = %err, "operation rejected");
                Response::rejected(&err)
            }
        }
    }

    fn classify(core: &mut ControllerCore, started: Instant, op: &Operation) -> Result<Response, ProcessError> {
        if !Self::validate(op) {
            return Err(ProcessError::Invalid);
        }

        let threat = Self::assess_threat(op);
        let response = Self::generate_response(op, threat)?;
        core.metrics.record_processed(started.elapsed(), threat);
        debug!(
            operation_id = op.id_or_unknown(),
            threat_level = threat.value(),
            "operation processed"
        );
        Ok(response)
    }
}
