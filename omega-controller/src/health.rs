use serde::Serialize;
use tracing::{debug, warn};

use crate::error::HealthCheckError;
use crate::recovery::RecoveryManager;
use crate::state::ControllerCore;

/// What a single health cycle observed and did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub response_time_ms: f64,
    pub threshold_breached: bool,
    pub recovery_attempted: bool,
    pub accuracy: f64,
    pub accuracy_target_met: bool,
}

pub struct HealthMonitor {
    recovery: RecoveryManager,
}

impl HealthMonitor {
    pub fn new(recovery: RecoveryManager) -> Self {
        Self { recovery }
    }

    /// One cycle, run with the controller lock held: recovers on a latency breach
    /// (when enabled), then refreshes accuracy. Accuracy is refreshed even when
    /// recovery fails; the failure is returned for the loop to log.
    pub fn run_cycle(&self, core: &mut ControllerCore) -> Result<HealthReport, HealthCheckError> {
        let response_time_ms = core.metrics.response_time_ms();
        let threshold_breached = response_time_ms > core.thresholds.max_response_time_ms;
        let recovery_attempted = threshold_breached && core.thresholds.auto_recovery_enabled;

        let mut outcome = Ok(());
        if threshold_breached {
            warn!(
                response_time_ms,
                max_response_time_ms = core.thresholds.max_response_time_ms,
                "response time exceeds threshold"
            );
            if recovery_attempted {
                outcome = self.recovery.recover(core);
            }
        }

        let accuracy = core.metrics.refresh_accuracy();
        let accuracy_target_met = core.metrics.meets_accuracy_target(core.thresholds.min_accuracy_threshold);
        debug!(accuracy, accuracy_target_met, "health check complete");

        outcome?;
        Ok(HealthReport {
            response_time_ms,
            threshold_breached,
            recovery_attempted,
            accuracy,
            accuracy_target_met,
        })
    }
}
