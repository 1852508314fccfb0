//! Mandate profile loading
//!
//! Handles:
//! - Reading the JSON profile from disk
//! - Falling back to the built-in default profile when the file is missing or unreadable
//! - Locating `operational_mode` at the top level or under `core_configuration`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{error, info, warn};

pub const DEFAULT_PROFILE_FILE: &str = "Dva12_Demon_Core_Profile.json";
pub const DEFAULT_PROFILE_ID: &str = "DVA12_OMEGA_SIMULACRUM";
pub const DEFAULT_OPERATIONAL_MODE: &str = "OMEGA_SIMULACRUM";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_mode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile document. Only the fields the mandate validates are typed; the rest
/// is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MandateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_configuration: Option<CoreConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MandateProfile {
    pub fn builtin() -> Self {
        Self {
            profile_id: Some(DEFAULT_PROFILE_ID.to_string()),
            version: Some("12.0.0".to_string()),
            operational_mode: Some(DEFAULT_OPERATIONAL_MODE.to_string()),
            status: Some("DEFAULT".to_string()),
            ..Self::default()
        }
    }

    /// Top-level `operational_mode` wins over `core_configuration.operational_mode`.
    pub fn effective_operational_mode(&self) -> Option<&str> {
        self.operational_mode.as_deref().or_else(|| {
            self.core_configuration
                .as_ref()
                .and_then(|core| core.operational_mode.as_deref())
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Where the loaded profile came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    File,
    Missing,
    Unreadable(String),
}

/// Loads the profile at `path`. Never fails: a missing or unreadable file yields
/// the built-in profile and says so in the returned source.
pub async fn load_profile(path: &Path) -> (MandateProfile, ProfileSource) {
    if !path.exists() {
        warn!(path = %path.display(), "mandate profile not found, using built-in profile");
        return (MandateProfile::builtin(), ProfileSource::Missing);
    }

    let parsed = match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str::<MandateProfile>(&content).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match parsed {
        Ok(profile) => {
            info!(
                profile_id = profile.profile_id.as_deref().unwrap_or("UNKNOWN"),
                "mandate profile loaded"
            );
            (profile, ProfileSource::File)
        }
        Err(reason) => {
            error!(path = %path.display(), error = %reason, "failed to load mandate profile");
            (MandateProfile::builtin(), ProfileSource::Unreadable(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_nested_operational_mode() {
        let profile: MandateProfile = serde_json::from_value(json!({
            "profile_id": "DVA12",
            "version": "12.1.0",
            "core_configuration": {"operational_mode": "SHADOW", "tier": 3},
            "directives": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(profile.effective_operational_mode(), Some("SHADOW"));
        assert_eq!(profile.core_configuration.unwrap().extra["tier"], 3);
        assert!(profile.extra.contains_key("directives"));
    }

    #[test]
    fn test_top_level_mode_wins() {
        let profile: MandateProfile = serde_json::from_value(json!({
            "operational_mode": "TOP",
            "core_configuration": {"operational_mode": "NESTED"}
        }))
        .unwrap();
        assert_eq!(profile.effective_operational_mode(), Some("TOP"));
    }

    #[tokio::test]
    async fn test_missing_profile_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let (profile, source) = load_profile(&dir.path().join(DEFAULT_PROFILE_FILE)).await;

        assert_eq!(source, ProfileSource::Missing);
        assert_eq!(profile.profile_id.as_deref(), Some(DEFAULT_PROFILE_ID));
        assert_eq!(profile.effective_operational_mode(), Some(DEFAULT_OPERATIONAL_MODE));
    }

    #[tokio::test]
    async fn test_invalid_json_uses_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let (profile, source) = load_profile(file.path()).await;
        assert!(matches!(source, ProfileSource::Unreadable(_)));
        assert_eq!(profile, MandateProfile::builtin());
    }
}
