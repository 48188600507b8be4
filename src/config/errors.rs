use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while loading or validating service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// An environment override could not be parsed.
    #[error("Invalid value '{value}' for {name}: {reason}")]
    EnvVar {
        /// Environment variable name.
        name: String,
        /// Raw value as found in the environment.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A setting is out of its valid range.
    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        /// Dotted setting path, e.g. `audio.hop_length`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
