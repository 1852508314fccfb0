/*!
Deployment sequence

1. verify the critical files under the base directory
2. activate the mandate
3. initialize and start the controller with the mandate registered as a sync peer

then report status periodically until a shutdown signal, stop the controller
and deactivate the mandate.
*/

use omega_controller::links::PROJECT_JANUS;
use omega_controller::{
    load_config, Controller, ControllerConfig, InitError, StartError, StateError, StaticLinks, StubPeer,
    SyncPeer,
};
use omega_mandate::{MandateError, MandateIntegration};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::files::missing_critical_files;
use crate::settings::DeployConfig;

pub const VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Initializing,
    Operational,
    Failed,
    Shutdown,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeploymentStatus::Initializing => "INITIALIZING",
            DeploymentStatus::Operational => "OPERATIONAL",
            DeploymentStatus::Failed => "FAILED",
            DeploymentStatus::Shutdown => "SHUTDOWN",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("critical files missing: {}", .0.join(", "))]
    MissingFiles(Vec<String>),
    #[error("mandate activation failed: {0}")]
    Mandate(#[from] MandateError),
    #[error("controller initialization failed: {0}")]
    ControllerInit(#[from] InitError),
    #[error("controller start failed: {0}")]
    ControllerStart(#[from] StartError),
    #[error("controller stop failed: {0}")]
    ControllerStop(#[from] StateError),
}

pub struct Orchestrator {
    run_id: Uuid,
    config: DeployConfig,
    status: DeploymentStatus,
    started: Instant,
    mandate: Option<MandateIntegration>,
    controller: Option<Controller>,
}

impl Orchestrator {
    pub fn new(config: DeployConfig) -> Self {
        let run_id = Uuid::new_v4();
        info!(%run_id, version = VERSION, "deployment orchestrator initialized");

        Self {
            run_id,
            config,
            status: DeploymentStatus::Initializing,
            started: Instant::now(),
            mandate: None,
            controller: None,
        }
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub fn mandate(&self) -> Option<&MandateIntegration> {
        self.mandate.as_ref()
    }

    /// Runs the deployment sequence with the controller configuration from
    /// `OMEGA_CONTROLLER_CONFIG` / `controller.yaml`.
    pub async fn deploy(&mut self) -> Result<(), DeployError> {
        let controller_config = load_config().await;
        self.deploy_with(controller_config).await
    }

    pub async fn deploy_with(&mut self, controller_config: ControllerConfig) -> Result<(), DeployError> {
        info!(run_id = %self.run_id, classification = omega_controller::CLASSIFICATION, "OMEGA deployment sequence");

        match self.run_steps(controller_config).await {
            Ok(()) => {
                self.status = DeploymentStatus::Operational;
                info!(run_id = %self.run_id, "deployment SUCCESS, all systems operational");
                Ok(())
            }
            Err(e) => {
                self.status = DeploymentStatus::Failed;
                error!(run_id = %self.run_id, error = %e, "deployment FAILED");
                Err(e)
            }
        }
    }

    async fn run_steps(&mut self, controller_config: ControllerConfig) -> Result<(), DeployError> {
        info!("step 1: verifying critical system files");
        if self.config.skip_file_check {
            warn!("critical file check skipped");
        } else {
            let missing = missing_critical_files(&self.config.base_dir, &self.config.profile);
            if !missing.is_empty() {
                return Err(DeployError::MissingFiles(missing));
            }
            info!("all critical files verified");
        }

        info!("step 2: activating mandate protocols");
        let mandate = MandateIntegration::new(self.config.profile_path()).await;
        let activation = mandate.activate();
        let janus: Arc<dyn SyncPeer> = Arc::new(StubPeer::new(PROJECT_JANUS));
        let peers = vec![mandate.sync_peer(), janus];
        self.mandate = Some(mandate);
        activation?;

        info!("step 3: starting controller");
        let controller = Controller::with_collaborators(controller_config, Arc::new(StaticLinks::default()), peers);
        let started = controller.initialize().map_err(DeployError::from).and_then(|_| {
            controller.start().map_err(DeployError::from)
        });
        self.controller = Some(controller);
        started
    }

    /// Reports status every interval until Ctrl+C, then shuts down.
    pub async fn maintain_operations(&mut self) -> Result<(), DeployError> {
        let signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
        };
        self.maintain_until(signal).await
    }

    pub async fn maintain_until<F>(&mut self, shutdown: F) -> Result<(), DeployError>
    where
        F: Future<Output = ()>,
    {
        info!(interval = ?self.config.status_interval, "entering operational maintenance mode, Ctrl+C to shut down");

        let period = self.config.status_interval;
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.log_operational_status(),
            }
        }

        info!("shutdown signal received");
        self.shutdown().await
    }

    pub fn log_operational_status(&self) {
        let uptime_secs = self.started.elapsed().as_secs();
        match &self.controller {
            Some(controller) => {
                let status = controller.get_status();
                info!(
                    deployment = %self.status,
                    uptime_secs,
                    state = %status.state,
                    processed = status.metrics.processed_operations,
                    threats_neutralized = status.metrics.threats_neutralized,
                    "operational status"
                );
            }
            None => info!(deployment = %self.status, uptime_secs, "operational status"),
        }
    }

    /// Stops the controller, then deactivates the mandate. The mandate is
    /// deactivated even when the controller reports a stop error.
    pub async fn shutdown(&mut self) -> Result<(), DeployError> {
        info!("initiating graceful shutdown");

        let stopped = match &self.controller {
            Some(controller) => controller.stop().await,
            None => Ok(()),
        };
        if let Some(mandate) = &self.mandate {
            mandate.deactivate()?;
        }
        self.status = DeploymentStatus::Shutdown;

        stopped?;
        info!("OMEGA shutdown complete");
        Ok(())
    }
}
