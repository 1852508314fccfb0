use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "OMEGA_CONTROLLER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "controller.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub max_response_time_ms: f64,
    /// SLA target, reported only.
    pub min_accuracy_threshold: f64,
    pub sync_interval_seconds: f64,
    pub health_check_interval_seconds: f64,
    pub auto_recovery_enabled: bool,
    /// Per-loop join timeout used by `stop()`.
    pub shutdown_timeout_seconds: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_response_time_ms: 100.0,
            min_accuracy_threshold: 0.9997,
            sync_interval_seconds: 1.0,
            health_check_interval_seconds: 5.0,
            auto_recovery_enabled: true,
            shutdown_timeout_seconds: 5.0,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be a positive number, got {value}")))
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_response_time_ms", self.max_response_time_ms)?;
        positive("sync_interval_seconds", self.sync_interval_seconds)?;
        positive("health_check_interval_seconds", self.health_check_interval_seconds)?;
        positive("shutdown_timeout_seconds", self.shutdown_timeout_seconds)?;
        if !(0.0..=1.0).contains(&self.min_accuracy_threshold) {
            return Err(ConfigError::Invalid(format!(
                "min_accuracy_threshold must be within [0, 1], got {}",
                self.min_accuracy_threshold
            )));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sync_interval_seconds)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs_f64(self.health_check_interval_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.shutdown_timeout_seconds)
    }

    /// Parses and validates a YAML document. A blank document yields the defaults.
    pub fn from_yaml_str(txt: &str) -> Result<Self, ConfigError> {
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ControllerConfig = serde_yaml::from_str(txt)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at `path`, falling back to defaults when it is missing,
    /// unreadable, malformed or invalid.
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "no controller config file, using defaults");
            return Self::default();
        }

        let loaded = match fs::read_to_string(path).await {
            Ok(txt) => Self::from_yaml_str(&txt),
            Err(e) => Err(ConfigError::from(e)),
        };
        match loaded {
            Ok(config) => {
                info!(path = %path.display(), "controller configuration loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "controller config rejected, using defaults");
                Self::default()
            }
        }
    }
}

/// Loads the configuration named by `OMEGA_CONTROLLER_CONFIG`, or `controller.yaml`.
pub async fn load_config() -> ControllerConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    ControllerConfig::load_from(path).await
}
