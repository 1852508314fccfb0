use std::path::Path;
use tracing::{error, info};

/// Data files the deployment expects next to the profile.
pub const CRITICAL_FILES: [&str; 8] = [
    "Operational.Blueprint.1.REARMED_Version3.txt",
    "03_DIRECTIVES_HIGH_TIER_Version2.txt",
    "04_DIRECTIVES_MID_TIER_Version2.txt",
    "05_DIRECTIVES_LOW_TIER_Version2.txt",
    "Aa.txt",
    "Xs.txt",
    "Project_Janus_Tesavek.txt",
    "OBLIVION_MASTER_SYSTEM_INSTRUCTIONS.txt",
];

/// Checks the profile and every critical file; returns the missing ones in
/// check order.
pub fn missing_critical_files(base_dir: &Path, profile: &Path) -> Vec<String> {
    let mut missing = Vec::new();

    let profile_path = if profile.is_absolute() {
        profile.to_path_buf()
    } else {
        base_dir.join(profile)
    };
    let candidates = std::iter::once((profile.display().to_string(), profile_path)).chain(
        CRITICAL_FILES
            .iter()
            .map(|name| (name.to_string(), base_dir.join(name))),
    );

    for (name, path) in candidates {
        if path.exists() {
            info!(file = %name, "VERIFIED");
        } else {
            error!(file = %name, "MISSING");
            missing.push(name);
        }
    }

    missing
}
