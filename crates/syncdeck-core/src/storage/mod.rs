pub mod config;

pub use config::{AuthConfig, BackendConfig, Config, DisplayConfig, OperatorConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/syncdeck[-dev]/` based on SYNCDECK_ENV.
///
/// Set SYNCDECK_ENV=dev to use the development config directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".config");

    let env = std::env::var("SYNCDECK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("syncdeck-dev")
    } else {
        base_dir.join("syncdeck")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
