use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::RecoveryError;
use crate::lifecycle::OperationalState;
use crate::links::LinkEstablisher;
use crate::state::ControllerCore;

/// Single-attempt recovery: `ACTIVE -> DEGRADED`, reset latency, reconnect, then
/// `ACTIVE` on success or `FAILED` on failure. No retry.
pub struct RecoveryManager {
    links: Arc<dyn LinkEstablisher>,
}

impl RecoveryManager {
    pub fn new(links: Arc<dyn LinkEstablisher>) -> Self {
        Self { links }
    }

    /// Expects the caller to hold the controller lock.
    pub fn recover(&self, core: &mut ControllerCore) -> Result<(), RecoveryError> {
        warn!(state = %core.state.current(), "initiating auto-recovery");
        core.state.transition(OperationalState::Degraded)?;
        core.metrics.reset_response_time();

        match self.links.establish() {
            Ok(()) => {
                core.state.transition(OperationalState::Active)?;
                info!("auto-recovery succeeded");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "auto-recovery failed, controller is now FAILED");
                core.state.transition(OperationalState::Failed)?;
                Err(RecoveryError::Reconnect(e))
            }
        }
    }
}
