use omega_controller::links::G3_MANDATE;
use omega_controller::{timestamp_now, SyncError, SyncPeer};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::profile::{load_profile, MandateProfile, ProfileSource, DEFAULT_OPERATIONAL_MODE};

pub const VERSION: &str = "3.0.0";
pub const CLASSIFICATION: &str = "ULTRA";

const CORE_SYSTEMS: [&str; 4] = [
    "JANUS_TESAVEK",
    "DVA12_PROFILE",
    "GEMINI3_CONTROLLER",
    "OPERATIONAL_BLUEPRINTS",
];
const INTEGRATION_LINKS: [(&str, &str); 3] = [
    ("Project_Janus_Tesavek.txt", "CONNECTED"),
    ("Gemini3_Mil_Controller", "SYNCHRONIZED"),
    ("Operational.Blueprint.1.REARMED_Version3.txt", "LOADED"),
];
const DIRECTIVE_TIERS: [&str; 3] = [
    "03_DIRECTIVES_HIGH_TIER_Version2.txt",
    "04_DIRECTIVES_MID_TIER_Version2.txt",
    "05_DIRECTIVES_LOW_TIER_Version2.txt",
];
const LOCK_SYSTEMS: [(&str, &str); 2] = [("Aa.txt", "PRIMARY_LOCK"), ("Xs.txt", "SECONDARY_LOCK")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MandateStatus {
    Configured,
    DefaultConfig,
    Error,
    Active,
    Failed,
    Deactivated,
}

impl fmt::Display for MandateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MandateStatus::Configured => "CONFIGURED",
            MandateStatus::DefaultConfig => "DEFAULT_CONFIG",
            MandateStatus::Error => "ERROR",
            MandateStatus::Active => "ACTIVE",
            MandateStatus::Failed => "FAILED",
            MandateStatus::Deactivated => "DEACTIVATED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MandateError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MandateReport {
    pub version: String,
    pub status: MandateStatus,
    pub operational_mode: String,
    pub timestamp: String,
    pub config_loaded: bool,
    pub classification: String,
}

/// Mandate lifecycle: load profile, `activate`, `deactivate`, `status`.
pub struct MandateIntegration {
    profile_path: PathBuf,
    profile: MandateProfile,
    status: Arc<Mutex<MandateStatus>>,
}

impl MandateIntegration {
    pub async fn new(profile_path: impl AsRef<Path>) -> Self {
        let profile_path = profile_path.as_ref().to_path_buf();
        info!(version = VERSION, "mandate integration initializing");

        let (profile, source) = load_profile(&profile_path).await;
        let status = match source {
            ProfileSource::File => MandateStatus::Configured,
            ProfileSource::Missing => MandateStatus::DefaultConfig,
            ProfileSource::Unreadable(_) => MandateStatus::Error,
        };
        Self::with_profile(profile_path, profile, status)
    }

    pub fn with_profile(profile_path: PathBuf, profile: MandateProfile, status: MandateStatus) -> Self {
        Self {
            profile_path,
            profile,
            status: Arc::new(Mutex::new(status)),
        }
    }

    pub fn profile(&self) -> &MandateProfile {
        &self.profile
    }

    pub fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    pub fn current_status(&self) -> MandateStatus {
        *self.status.lock()
    }

    /// Runs the activation sequence. A validation failure leaves the status as is.
    pub fn activate(&self) -> Result<(), MandateError> {
        info!("activating mandate protocols");
        if let Err(e) = self.validate_configuration() {
            error!(error = %e, "mandate configuration validation failed");
            return Err(e);
        }

        self.initialize_core_systems();
        self.establish_integration_links();
        self.activate_directive_tiers();
        self.engage_lock_systems();

        *self.status.lock() = MandateStatus::Active;
        info!("mandate protocols ACTIVATED");
        Ok(())
    }

    pub fn deactivate(&self) -> Result<(), MandateError> {
        info!("deactivating mandate protocols");
        for step in [
            "disengaging lock systems",
            "deactivating directive tiers",
            "closing integration links",
            "shutting down core systems",
        ] {
            info!(step, "mandate shutdown");
        }
        *self.status.lock() = MandateStatus::Deactivated;
        info!("mandate protocols DEACTIVATED");
        Ok(())
    }

    pub fn status(&self) -> MandateReport {
        MandateReport {
            version: VERSION.to_string(),
            status: self.current_status(),
            operational_mode: DEFAULT_OPERATIONAL_MODE.to_string(),
            timestamp: timestamp_now(),
            config_loaded: !self.profile.is_empty(),
            classification: CLASSIFICATION.to_string(),
        }
    }

    /// Sync peer for the controller's sync loop; available only while `ACTIVE`.
    pub fn sync_peer(&self) -> Arc<dyn SyncPeer> {
        Arc::new(MandateSyncPeer {
            status: self.status.clone(),
        })
    }

    fn validate_configuration(&self) -> Result<(), MandateError> {
        if self.profile.profile_id.is_none() {
            return Err(MandateError::MissingField("profile_id"));
        }
        if self.profile.version.is_none() {
            return Err(MandateError::MissingField("version"));
        }
        if self.profile.effective_operational_mode().is_none() {
            return Err(MandateError::MissingField("operational_mode"));
        }
        info!("mandate configuration validation: PASSED");
        Ok(())
    }

    fn initialize_core_systems(&self) {
        for system in CORE_SYSTEMS {
            info!(system, "core system ONLINE");
        }
    }

    fn establish_integration_links(&self) {
        for (link, status) in INTEGRATION_LINKS {
            info!(link, status, "integration link");
        }
    }

    fn activate_directive_tiers(&self) {
        for tier in DIRECTIVE_TIERS {
            info!(tier, "directive tier ACTIVE");
        }
    }

    fn engage_lock_systems(&self) {
        for (lock, kind) in LOCK_SYSTEMS {
            info!(lock, kind, "lock system ENGAGED");
        }
    }
}

struct MandateSyncPeer {
    status: Arc<Mutex<MandateStatus>>,
}

impl SyncPeer for MandateSyncPeer {
    fn name(&self) -> &str {
        G3_MANDATE
    }

    fn is_available(&self) -> bool {
        *self.status.lock() == MandateStatus::Active
    }

    fn synchronize(&self) -> Result<(), SyncError> {
        debug!("mandate synchronized");
        Ok(())
    }
}
