use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::app_dirs;

use super::env::apply_overrides;
use super::errors::ConfigError;
use super::types::ServiceConfig;

/// Default filename looked up inside the app root directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MOODLENS_CONFIG";

/// Resolve, parse, override and validate the service configuration.
///
/// Order: defaults, then the TOML file (explicit path, `MOODLENS_CONFIG`, or
/// `<app root>/config.toml` when present), then `MOODLENS_*` variables.
pub fn load(explicit: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match resolve_config_path(explicit) {
        Some(path) => load_from_path(&path)?,
        None => ServiceConfig::default(),
    };
    apply_overrides(&mut config, std::env::vars())?;
    let config = config.normalized();
    config.validate()?;
    Ok(config)
}

/// Parse a TOML config file without applying environment overrides.
pub fn load_from_path(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ServiceConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        if !value.trim().is_empty() {
            return Some(PathBuf::from(value.trim()));
        }
    }
    match app_dirs::app_root_dir() {
        Ok(root) => Some(root.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
        Err(err) => {
            warn!("Config directory unavailable, using defaults: {err}");
            None
        }
    }
}
