use clap::Subcommand;
use proctor_core::error::{ConfigError, CoreError, Result};
use proctor_core::MonitorConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "presence.absence_threshold_ms", "objects.classes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Check the stored config for invalid values
    Validate,
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = MonitorConfig::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = MonitorConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = MonitorConfig::load()?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| CoreError::Custom(format!("cannot render config: {e}")))?;
            println!("{rendered}");
        }
        ConfigAction::Reset => {
            MonitorConfig::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Validate => {
            MonitorConfig::load()?.validate()?;
            println!("config ok");
        }
    }
    Ok(())
}
