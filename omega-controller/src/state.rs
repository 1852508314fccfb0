use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::ControllerConfig;
use crate::lifecycle::StateMachine;
use crate::metrics::MetricsTracker;

/// Thresholds derived from the configuration, read by the health monitor under
/// the same lock as the state and metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthThresholds {
    pub max_response_time_ms: f64,
    pub min_accuracy_threshold: f64,
    pub auto_recovery_enabled: bool,
}

impl From<&ControllerConfig> for HealthThresholds {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            max_response_time_ms: config.max_response_time_ms,
            min_accuracy_threshold: config.min_accuracy_threshold,
            auto_recovery_enabled: config.auto_recovery_enabled,
        }
    }
}

/// Everything guarded by the controller's single lock.
#[derive(Debug)]
pub struct ControllerCore {
    pub state: StateMachine,
    pub metrics: MetricsTracker,
    pub thresholds: HealthThresholds,
}

impl ControllerCore {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            state: StateMachine::new(),
            metrics: MetricsTracker::new(),
            thresholds: HealthThresholds::from(config),
        }
    }
}

pub type SharedCore = Arc<Mutex<ControllerCore>>;

pub fn new_core(config: &ControllerConfig) -> SharedCore {
    Arc::new(Mutex::new(ControllerCore::new(config)))
}
