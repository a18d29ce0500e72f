pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{ConfigurationError, Result};

const CONFIG_FILE_NAME: &str = ".connectome.toml";

/// Get the global config file path (~/.connectome.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (cwd/.connectome.toml)
pub fn local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration.
///
/// An explicitly given file must exist and parse; otherwise the local
/// config is tried first, then the global one, and a missing or malformed
/// discovered file falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigurationError::ParsingFailed(format!("cannot read {}: {e}", path.display()))
        })?;
        return toml::from_str(&content).map_err(|e| {
            ConfigurationError::ParsingFailed(format!("cannot parse {}: {e}", path.display()))
                .into()
        });
    }

    for candidate in [local_config_path(), global_config_path()]
        .into_iter()
        .flatten()
    {
        if !candidate.exists() {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&candidate) {
            match toml::from_str(&content) {
                Ok(config) => return Ok(config),
                Err(e) => warn!(
                    "ignoring malformed config {}: {e}",
                    candidate.display()
                ),
            }
        }
    }

    Ok(types::Config::default())
}
