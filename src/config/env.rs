//! `MOODLENS_*` environment overrides layered on top of file settings.

use std::path::PathBuf;
use std::str::FromStr;

use super::errors::ConfigError;
use super::types::{DevicePreference, ServiceConfig};

pub const ENV_SAMPLE_RATE: &str = "MOODLENS_SAMPLE_RATE";
pub const ENV_DURATION: &str = "MOODLENS_DURATION";
pub const ENV_FRAME_SIZE: &str = "MOODLENS_FRAME_SIZE";
pub const ENV_HOP_LENGTH: &str = "MOODLENS_HOP_LENGTH";
pub const ENV_DROP_NYQUIST: &str = "MOODLENS_DROP_NYQUIST";
pub const ENV_MODEL_PATH: &str = "MOODLENS_MODEL_PATH";
pub const ENV_MODEL_SHA256: &str = "MOODLENS_MODEL_SHA256";
pub const ENV_DEVICE: &str = "MOODLENS_DEVICE";
pub const ENV_SCORE_MIN: &str = "MOODLENS_SCORE_MIN";
pub const ENV_SCORE_MAX: &str = "MOODLENS_SCORE_MAX";
pub const ENV_ALLOWED_EXTENSIONS: &str = "MOODLENS_ALLOWED_EXTENSIONS";
pub const ENV_MAX_FILE_SIZE: &str = "MOODLENS_MAX_FILE_SIZE";
pub const ENV_UPLOAD_DIR: &str = "MOODLENS_UPLOAD_DIR";
pub const ENV_LOG_LEVEL: &str = "MOODLENS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MOODLENS_LOG_DIR";

/// Apply recognized `MOODLENS_*` variables from `vars` onto `config`.
///
/// Unknown keys are ignored. Empty values are treated as unset.
pub fn apply_overrides<I, K, V>(config: &mut ServiceConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let key = key.as_ref();
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        match key {
            ENV_SAMPLE_RATE => config.audio.sample_rate = parse(key, value)?,
            ENV_DURATION => config.audio.duration_seconds = parse(key, value)?,
            ENV_FRAME_SIZE => config.audio.frame_size = parse(key, value)?,
            ENV_HOP_LENGTH => config.audio.hop_length = parse(key, value)?,
            ENV_DROP_NYQUIST => config.audio.drop_nyquist = parse_bool(key, value)?,
            ENV_MODEL_PATH => config.model.path = PathBuf::from(value),
            ENV_MODEL_SHA256 => config.model.sha256 = Some(value.to_string()),
            ENV_DEVICE => {
                config.model.device =
                    DevicePreference::from_env(value).ok_or_else(|| ConfigError::EnvVar {
                        name: key.to_string(),
                        value: value.to_string(),
                        reason: "expected auto, cpu, wgpu or cuda".to_string(),
                    })?
            }
            ENV_SCORE_MIN => config.scores.min = parse(key, value)?,
            ENV_SCORE_MAX => config.scores.max = parse(key, value)?,
            ENV_ALLOWED_EXTENSIONS => {
                config.upload.allowed_extensions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|ext| !ext.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            ENV_MAX_FILE_SIZE => config.upload.max_file_size = parse(key, value)?,
            ENV_UPLOAD_DIR => config.upload.temp_dir = Some(PathBuf::from(value)),
            ENV_LOG_LEVEL => config.logging.level = value.to_string(),
            ENV_LOG_DIR => config.logging.log_dir = Some(PathBuf::from(value)),
            _ => {}
        }
    }
    Ok(())
}

fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| ConfigError::EnvVar {
        name: name.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvVar {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
