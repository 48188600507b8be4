use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_allowed_extensions, default_api_title, default_duration_seconds, default_frame_size,
    default_hop_length, default_log_level, default_max_file_size, default_model_path,
    default_sample_rate, default_score_decimals, default_score_max, default_score_min,
    default_true,
};
use super::errors::ConfigError;

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Human readable service name reported by `info`.
    #[serde(default = "default_api_title")]
    pub api_title: String,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub scores: ScoreSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_title: default_api_title(),
            audio: AudioSettings::default(),
            model: ModelSettings::default(),
            upload: UploadSettings::default(),
            scores: ScoreSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Canonicalize free-form values (extension spelling, hex case).
    pub fn normalized(mut self) -> Self {
        let mut extensions: Vec<String> = Vec::new();
        for ext in self.upload.allowed_extensions.iter().filter_map(|ext| normalize_extension(ext)) {
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        self.upload.allowed_extensions = extensions;
        self.model.sha256 = self
            .model
            .sha256
            .take()
            .map(|hex| hex.trim().to_ascii_lowercase())
            .filter(|hex| !hex.is_empty());
        self
    }

    /// Reject settings the preprocessing or rescaling contract cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let audio = &self.audio;
        if audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be greater than zero"));
        }
        if audio.duration_seconds == 0 {
            return Err(invalid("audio.duration_seconds", "must be greater than zero"));
        }
        if audio.frame_size < 2 {
            return Err(invalid("audio.frame_size", "must be at least 2"));
        }
        if audio.hop_length == 0 || audio.hop_length > audio.frame_size {
            return Err(invalid(
                "audio.hop_length",
                format!("must be in 1..={}", audio.frame_size),
            ));
        }
        let scores = &self.scores;
        if !scores.min.is_finite() || !scores.max.is_finite() || scores.min >= scores.max {
            return Err(invalid(
                "scores",
                format!("min ({}) must be below max ({})", scores.min, scores.max),
            ));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(invalid("upload.allowed_extensions", "must not be empty"));
        }
        if self.upload.max_file_size == 0 {
            return Err(invalid("upload.max_file_size", "must be greater than zero"));
        }
        if let Some(hex) = &self.model.sha256 {
            if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid(
                    "model.sha256",
                    format!("expected 64 hex characters, got '{hex}'"),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Preprocessing constants shared with the training pipeline.
///
/// Changing any of these without retraining silently degrades predictions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    /// Canonical sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Analysis window in seconds; inputs are padded or truncated to it.
    #[serde(default = "default_duration_seconds", alias = "duration")]
    pub duration_seconds: u32,
    /// STFT window size in samples.
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// STFT hop in samples.
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    /// Discard the Nyquist bin so the bin count is `frame_size / 2`.
    #[serde(default = "default_true")]
    pub drop_nyquist: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            duration_seconds: default_duration_seconds(),
            frame_size: default_frame_size(),
            hop_length: default_hop_length(),
            drop_nyquist: default_true(),
        }
    }
}

impl AudioSettings {
    /// Exact waveform length fed to the spectrogram stage.
    pub fn target_len(&self) -> usize {
        self.sample_rate as usize * self.duration_seconds as usize
    }
}

/// Compute device requested for model inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Prefer a GPU backend, falling back to CPU.
    #[default]
    Auto,
    /// Pure CPU inference.
    Cpu,
    /// WGPU (Vulkan/Metal).
    Wgpu,
    /// CUDA, only when built with the `cuda` feature.
    Cuda,
}

impl DevicePreference {
    /// Parse a device preference from an environment variable value.
    pub fn from_env(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Some(Self::Auto),
            "cpu" | "ndarray" => Some(Self::Cpu),
            "wgpu" | "gpu" | "vulkan" | "metal" => Some(Self::Wgpu),
            "cuda" => Some(Self::Cuda),
            _ => None,
        }
    }
}

/// Weight file location and integrity settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSettings {
    /// PyTorch state dict (`.pth`/`.pt`) or safetensors file.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    /// Optional expected SHA-256 (hex) of the weight file.
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub device: DevicePreference,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            sha256: None,
            device: DevicePreference::default(),
        }
    }
}

/// Upload validation limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSettings {
    /// Lowercase extensions with a leading dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Directory for temporary upload files; the OS temp dir when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            max_file_size: default_max_file_size(),
            temp_dir: None,
        }
    }
}

impl UploadSettings {
    /// Return the normalized extension of `filename` when it is allowlisted.
    pub fn allowed_extension(&self, filename: &str) -> Option<String> {
        let ext = Path::new(filename).extension()?.to_str()?;
        let ext = normalize_extension(ext)?;
        self.allowed_extensions.contains(&ext).then_some(ext)
    }
}

/// Reporting range for rescaled scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreSettings {
    #[serde(default = "default_score_min")]
    pub min: f32,
    #[serde(default = "default_score_max")]
    pub max: f32,
    /// Decimal places kept in reported scores.
    #[serde(default = "default_score_decimals")]
    pub decimals: u32,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            min: default_score_min(),
            max: default_score_max(),
            decimals: default_score_decimals(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log directory; defaults to `<app root>/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Lowercase an extension and ensure a single leading dot.
pub(crate) fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_training_pipeline() {
        let config = ServiceConfig::default();
        assert_eq!(config.audio.sample_rate, 22_050);
        assert_eq!(config.audio.duration_seconds, 15);
        assert_eq!(config.audio.frame_size, 512);
        assert_eq!(config.audio.hop_length, 256);
        assert_eq!(config.audio.target_len(), 330_750);
        assert!(config.audio.drop_nyquist);
        assert_eq!(config.scores.min, 1.0);
        assert_eq!(config.scores.max, 7.83);
        assert_eq!(config.upload.max_file_size, 50 * 1024 * 1024);
        config.validate().unwrap();
    }

    #[test]
    fn allowed_extension_is_case_insensitive() {
        let upload = UploadSettings::default();
        assert_eq!(upload.allowed_extension("Song.MP3").as_deref(), Some(".mp3"));
        assert_eq!(upload.allowed_extension("a.b.flac").as_deref(), Some(".flac"));
        assert_eq!(upload.allowed_extension("clip.aiff"), None);
        assert_eq!(upload.allowed_extension("no_extension"), None);
    }

    #[test]
    fn normalized_canonicalizes_extensions_and_hash() {
        let mut config = ServiceConfig::default();
        config.upload.allowed_extensions = vec!["WAV".into(), ".wav".into(), " ".into()];
        config.model.sha256 = Some(format!("  {}  ", "AB".repeat(32)));
        let config = config.normalized();
        assert_eq!(config.upload.allowed_extensions, vec![".wav".to_string()]);
        assert_eq!(config.model.sha256.as_deref(), Some("ab".repeat(32).as_str()));
    }

    #[test]
    fn validate_rejects_inconsistent_settings() {
        let mut config = ServiceConfig::default();
        config.audio.hop_length = 1024;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "audio.hop_length", .. })
        ));

        let mut config = ServiceConfig::default();
        config.scores.min = 10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "scores", .. })
        ));

        let mut config = ServiceConfig::default();
        config.model.sha256 = Some("abc".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "model.sha256", .. })
        ));

        let mut config = ServiceConfig::default();
        config.upload.allowed_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn device_preference_parses_aliases() {
        assert_eq!(DevicePreference::from_env("CPU"), Some(DevicePreference::Cpu));
        assert_eq!(DevicePreference::from_env("vulkan"), Some(DevicePreference::Wgpu));
        assert_eq!(DevicePreference::from_env("auto"), Some(DevicePreference::Auto));
        assert_eq!(DevicePreference::from_env("tpu"), None);
    }
}
