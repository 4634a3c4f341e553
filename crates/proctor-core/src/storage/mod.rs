mod config;

pub use config::{
    AttentionConfig, FaceRequirement, MonitorConfig, MultiplicityConfig, MultiplicityPolicy,
    ObjectsConfig, PresenceConfig, SamplingConfig, ScoringConfig, TransportConfig,
    MAX_INTERVAL_MS,
};

use std::path::PathBuf;

/// Returns `~/.config/proctor[-dev]/` based on PROCTOR_ENV.
///
/// Set PROCTOR_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PROCTOR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("proctor-dev")
    } else {
        base_dir.join("proctor")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
