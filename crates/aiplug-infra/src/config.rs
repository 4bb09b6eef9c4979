//! Adapter configuration loader.
//!
//! Reads `aiplug.toml` from the data directory (`~/.aiplug/` in production)
//! and deserializes it into [`AdapterConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use aiplug_types::config::AdapterConfig;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE: &str = "aiplug.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `AIPLUG_HOME` environment variable
/// 2. `~/.aiplug`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AIPLUG_HOME") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".aiplug");
    }

    PathBuf::from(".aiplug")
}

/// Load adapter configuration from `{data_dir}/aiplug.toml`.
///
/// - Missing file: [`AdapterConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> AdapterConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE} found at {}, using defaults", config_path.display());
            return AdapterConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AdapterConfig::default();
        }
    };

    match toml::from_str::<AdapterConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AdapterConfig::default()
        }
    }
}

/// Path of the JSON secret/config store named by `config`.
pub fn store_path(data_dir: &Path, config: &AdapterConfig) -> PathBuf {
    data_dir.join(&config.secrets_file)
}
