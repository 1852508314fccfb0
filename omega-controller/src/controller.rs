//! Controller composition root.
//!
//! Owns the state machine and metrics (inside one [`SharedCore`] lock), the
//! operation processor, and the two background loops. Lifecycle:
//! `initialize -> start -> (process_operation / get_status) -> stop`.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ControllerConfig;
use crate::error::{HealthCheckError, InitError, StartError, StateError};
use crate::health::{HealthMonitor, HealthReport};
use crate::lifecycle::{OperationalState, StateTransition};
use crate::links::{LinkEstablisher, StaticLinks};
use crate::metrics::ControllerMetrics;
use crate::models::{timestamp_now, Operation, Response, StatusReport};
use crate::processor::OperationProcessor;
use crate::recovery::RecoveryManager;
use crate::schedule::{join_within, spawn_periodic};
use crate::state::{new_core, SharedCore};
use crate::sync::{default_peers, SyncLoop, SyncPeer, SyncReport};

pub const VERSION: &str = "3.0.1-FIX";
pub const CLASSIFICATION: &str = "ULTRA";

struct BackgroundTasks {
    cancel: CancellationToken,
    health: JoinHandle<()>,
    sync: JoinHandle<()>,
}

pub struct Controller {
    config: ControllerConfig,
    core: SharedCore,
    processor: OperationProcessor,
    links: Arc<dyn LinkEstablisher>,
    health: Arc<HealthMonitor>,
    sync: Arc<SyncLoop>,
    tasks: Mutex<Option<BackgroundTasks>>,
}

impl Controller {
    /// Controller with the default links and the no-op sync peers.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_collaborators(config, Arc::new(StaticLinks::default()), default_peers())
    }

    pub fn with_collaborators(
        config: ControllerConfig,
        links: Arc<dyn LinkEstablisher>,
        peers: Vec<Arc<dyn SyncPeer>>,
    ) -> Self {
        let health = HealthMonitor::new(RecoveryManager::new(links.clone()));
        info!(version = VERSION, classification = CLASSIFICATION, "controller constructed");

        Self {
            core: new_core(&config),
            config,
            processor: OperationProcessor,
            links,
            health: Arc::new(health),
            sync: Arc::new(SyncLoop::new(peers)),
            tasks: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Moves `OFFLINE` (or `FAILED`, as an explicit re-initialization) to `READY`.
    /// A failing step leaves the controller in `FAILED`.
    pub fn initialize(&self) -> Result<(), InitError> {
        info!("initializing controller");
        self.core.lock().state.transition(OperationalState::Initializing)?;

        if let Err(err) = self.run_initialization_steps() {
            error!(error = %err, "initialization failed");
            if let Err(e) = self.core.lock().state.transition(OperationalState::Failed) {
                warn!(error = %e, "could not record initialization failure");
            }
            return Err(err);
        }

        self.core.lock().state.transition(OperationalState::Ready)?;
        info!("controller READY");
        Ok(())
    }

    fn run_initialization_steps(&self) -> Result<(), InitError> {
        Handle::try_current().map_err(|e| InitError::Requirements(e.to_string()))?;
        info!("system requirements validated");

        self.config.validate()?;
        info!("configuration validated");

        self.links.establish()?;
        info!(links = self.links.links().len(), "secure connections established");

        self.sync.prepare()?;
        info!(peers = ?self.sync.peer_names(), "synchronization ready");
        Ok(())
    }

    /// Spawns the health and sync loops on the current Tokio runtime and moves
    /// `READY -> ACTIVE`.
    pub fn start(&self) -> Result<(), StartError> {
        let mut tasks = self.tasks.lock();
        let current = self.core.lock().state.current();
        if current != OperationalState::Ready {
            error!(state = %current, "cannot start controller");
            return Err(StartError::NotReady(current));
        }
        let runtime = Handle::try_current().map_err(|e| StartError::Runtime(e.to_string()))?;

        // Loops left over from before a re-initialization out of FAILED.
        if let Some(stale) = tasks.take() {
            warn!("stopping background loops left from the previous run");
            stale.cancel.cancel();
            stale.health.abort();
            stale.sync.abort();
        }

        let cancel = CancellationToken::new();
        let health = {
            let core = self.core.clone();
            let monitor = self.health.clone();
            spawn_periodic(&runtime, "health monitor", self.config.health_check_interval(), cancel.clone(), move || {
                let mut core = core.lock();
                if let Err(e) = monitor.run_cycle(&mut core) {
                    error!(error = %e, "health monitor cycle failed");
                }
            })
        };
        let sync = {
            let core = self.core.clone();
            let sync = self.sync.clone();
            spawn_periodic(&runtime, "sync loop", self.config.sync_interval(), cancel.clone(), move || {
                let _core = core.lock();
                sync.run_cycle();
            })
        };

        if let Err(e) = self.core.lock().state.transition(OperationalState::Active) {
            cancel.cancel();
            return Err(e.into());
        }
        *tasks = Some(BackgroundTasks { cancel, health, sync });
        info!("controller ACTIVE");
        Ok(())
    }

    /// Cancels both loops, waits for each up to the shutdown timeout (aborting
    /// stragglers), then moves `ACTIVE -> OFFLINE`. Stopping an `OFFLINE`
    /// controller is a no-op. From any other state the loops are still stopped
    /// but the state is left as is and the refusal is returned.
    pub async fn stop(&self) -> Result<(), StateError> {
        info!("stopping controller");
        let tasks = self.tasks.lock().take();
        if let Some(tasks) = tasks {
            tasks.cancel.cancel();
            let timeout = self.config.shutdown_timeout();
            join_within("health monitor", tasks.health, timeout).await;
            join_within("sync loop", tasks.sync, timeout).await;
        }

        let mut core = self.core.lock();
        if core.state.is(OperationalState::Offline) {
            return Ok(());
        }
        core.state.transition(OperationalState::Offline)?;
        info!("controller STOPPED");
        Ok(())
    }

    pub fn process_operation(&self, op: &Operation) -> Response {
        let started = Instant::now();
        let mut core = self.core.lock();
        self.processor.process(&mut core, started, op)
    }

    pub fn get_status(&self) -> StatusReport {
        let mut core = self.core.lock();
        core.metrics.refresh_uptime();

        StatusReport {
            version: VERSION.to_string(),
            state: core.state.current(),
            classification: CLASSIFICATION.to_string(),
            metrics: core.metrics.snapshot(),
            timestamp: timestamp_now(),
        }
    }

    pub fn state(&self) -> OperationalState {
        self.core.lock().state.current()
    }

    pub fn metrics(&self) -> ControllerMetrics {
        let mut core = self.core.lock();
        core.metrics.refresh_uptime();
        core.metrics.snapshot()
    }

    pub fn journal(&self) -> Vec<StateTransition> {
        self.core.lock().state.journal()
    }

    /// Runs one health cycle now, outside the schedule.
    pub fn run_health_check(&self) -> Result<HealthReport, HealthCheckError> {
        let mut core = self.core.lock();
        self.health.run_cycle(&mut core)
    }

    /// Runs one synchronization cycle now, outside the schedule.
    pub fn run_sync(&self) -> SyncReport {
        let _core = self.core.lock();
        self.sync.run_cycle()
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().is_some()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::OperationalState::*;
    use crate::models::ThreatLevel;
    use serde_json::json;
    use std::time::Duration;

    fn scan(id: &str, priority: &str) -> Operation {
        Operation::from_json(json!({"id": id, "type": "SCAN", "priority": priority, "payload": {}})).unwrap()
    }

    fn quiet_config() -> ControllerConfig {
        ControllerConfig {
            sync_interval_seconds: 3600.0,
            health_check_interval_seconds: 3600.0,
            shutdown_timeout_seconds: 2.0,
            ..ControllerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let controller = Controller::new(quiet_config());
        assert_eq!(controller.state(), Offline);

        controller.initialize().unwrap();
        assert_eq!(controller.state(), Ready);
        controller.start().unwrap();
        assert_eq!(controller.state(), Active);
        assert!(controller.is_running());

        let response = controller.process_operation(&scan("OP1", "HIGH"));
        assert!(response.is_success());

        let status = controller.get_status();
        assert_eq!(status.version, VERSION);
        assert_eq!(status.classification, CLASSIFICATION);
        assert_eq!(status.state, Active);
        assert_eq!(status.metrics.processed_operations, 1);
        assert_eq!(status.metrics.threats_neutralized, 1);

        controller.stop().await.unwrap();
        assert_eq!(controller.state(), Offline);
        assert!(!controller.is_running());
        assert_eq!(
            controller.process_operation(&scan("OP2", "LOW")).error(),
            Some("Controller not active")
        );
    }

    #[tokio::test]
    async fn test_stop_while_loops_sleep_is_prompt() {
        let controller = Controller::new(quiet_config());
        controller.initialize().unwrap();
        controller.start().unwrap();

        let started = std::time::Instant::now();
        controller.stop().await.unwrap();

        assert!(started.elapsed() < controller.config().shutdown_timeout());
        assert_eq!(controller.state(), Offline);
    }

    #[tokio::test]
    async fn test_start_requires_ready() {
        let controller = Controller::new(quiet_config());
        let err = controller.start().unwrap_err();
        assert!(matches!(err, StartError::NotReady(Offline)));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_initialize_twice_is_refused() {
        let controller = Controller::new(quiet_config());
        controller.initialize().unwrap();

        let err = controller.initialize().unwrap_err();
        assert!(matches!(err, InitError::State(_)));
        assert_eq!(controller.state(), Ready);
    }

    #[test]
    fn test_initialize_without_runtime_fails() {
        let controller = Controller::new(quiet_config());
        let err = controller.initialize().unwrap_err();
        assert!(matches!(err, InitError::Requirements(_)));
        assert_eq!(controller.state(), Failed);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_initialization() {
        let controller = Controller::new(ControllerConfig {
            sync_interval_seconds: -1.0,
            ..quiet_config()
        });
        assert!(matches!(controller.initialize().unwrap_err(), InitError::Config(_)));
        assert_eq!(controller.state(), Failed);
    }

    #[tokio::test]
    async fn test_manual_health_check_recovers() {
        let controller = Controller::new(quiet_config());
        controller.initialize().unwrap();
        controller.start().unwrap();
        controller
            .core
            .lock()
            .metrics
            .record_processed(Duration::from_millis(150), ThreatLevel::Low);

        let report = controller.run_health_check().unwrap();
        assert!(report.recovery_attempted);
        assert_eq!(controller.state(), Active);
        assert_eq!(controller.metrics().response_time_ms, 0.0);

        let tail: Vec<_> = controller.journal().into_iter().rev().take(2).map(|t| (t.from, t.to)).collect();
        assert_eq!(tail, vec![(Degraded, Active), (Active, Degraded)]);
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_sync_runs_default_peers() {
        let controller = Controller::new(quiet_config());
        assert_eq!(controller.run_sync().synchronized, 2);
    }

    #[tokio::test]
    async fn test_uptime_grows() {
        let controller = Controller::new(quiet_config());
        let first = controller.get_status().metrics.uptime_seconds;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(controller.get_status().metrics.uptime_seconds > first);
    }
}
