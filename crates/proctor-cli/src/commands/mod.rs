pub mod config;
pub mod replay;
pub mod report;
pub mod score;

use std::path::Path;

use proctor_core::error::Result;
use proctor_core::MonitorConfig;

/// Read and parse a JSON file.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load the user's configuration and make sure it is usable.
pub(crate) fn load_config() -> Result<MonitorConfig> {
    let config = MonitorConfig::load()?;
    config.validate()?;
    Ok(config)
}

/// Build a single-threaded runtime for one-off network calls.
pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
