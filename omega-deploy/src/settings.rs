use omega_mandate::DEFAULT_PROFILE_FILE;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const BASE_DIR_ENV: &str = "OMEGA_BASE_DIR";
pub const PROFILE_ENV: &str = "OMEGA_PROFILE";
pub const STATUS_INTERVAL_ENV: &str = "OMEGA_STATUS_INTERVAL_SECS";
pub const SKIP_FILE_CHECK_ENV: &str = "OMEGA_SKIP_FILE_CHECK";

const DEFAULT_STATUS_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    pub base_dir: PathBuf,
    /// Relative paths are resolved under `base_dir`.
    pub profile: PathBuf,
    pub status_interval: Duration,
    pub skip_file_check: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            profile: PathBuf::from(DEFAULT_PROFILE_FILE),
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_SECS),
            skip_file_check: false,
        }
    }
}

impl DeployConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(dir) = lookup(BASE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.base_dir = PathBuf::from(dir);
        }
        if let Some(profile) = lookup(PROFILE_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.profile = PathBuf::from(profile);
        }
        if let Some(raw) = lookup(STATUS_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => cfg.status_interval = Duration::from_secs(secs),
                _ => warn!(
                    value = %raw,
                    default = DEFAULT_STATUS_INTERVAL_SECS,
                    "invalid status interval, using default"
                ),
            }
        }
        if let Some(flag) = lookup(SKIP_FILE_CHECK_ENV) {
            cfg.skip_file_check = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        cfg
    }

    pub fn profile_path(&self) -> PathBuf {
        if self.profile.is_absolute() {
            self.profile.clone()
        } else {
            self.base_dir.join(&self.profile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = DeployConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, DeployConfig::default());
        assert_eq!(cfg.profile_path(), PathBuf::from(".").join(DEFAULT_PROFILE_FILE));
        assert_eq!(cfg.status_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let cfg = DeployConfig::from_lookup(lookup(&[
            (BASE_DIR_ENV, "/srv/omega"),
            (PROFILE_ENV, "custom.json"),
            (STATUS_INTERVAL_ENV, "5"),
            (SKIP_FILE_CHECK_ENV, "true"),
        ]));

        assert_eq!(cfg.profile_path(), PathBuf::from("/srv/omega/custom.json"));
        assert_eq!(cfg.status_interval, Duration::from_secs(5));
        assert!(cfg.skip_file_check);
    }

    #[test]
    fn test_invalid_interval_keeps_default() {
        for raw in ["0", "-3", "soon"] {
            let cfg = DeployConfig::from_lookup(lookup(&[(STATUS_INTERVAL_ENV, raw)]));
            assert_eq!(cfg.status_interval, Duration::from_secs(30));
        }
    }
}
