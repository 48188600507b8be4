use std::path::PathBuf;

pub(super) const DEFAULT_SAMPLE_RATE: u32 = 22_050;
pub(super) const DEFAULT_DURATION_SECONDS: u32 = 15;
pub(super) const DEFAULT_FRAME_SIZE: usize = 512;
pub(super) const DEFAULT_HOP_LENGTH: usize = 256;
pub(super) const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub(super) const DEFAULT_ALLOWED_EXTENSIONS: [&str; 5] = [".mp3", ".wav", ".flac", ".m4a", ".ogg"];

pub(super) fn default_api_title() -> String {
    "Music Emotion Recognition API".to_string()
}

pub(super) fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

pub(super) fn default_duration_seconds() -> u32 {
    DEFAULT_DURATION_SECONDS
}

pub(super) fn default_frame_size() -> usize {
    DEFAULT_FRAME_SIZE
}

pub(super) fn default_hop_length() -> usize {
    DEFAULT_HOP_LENGTH
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_model_path() -> PathBuf {
    PathBuf::from("best.pth")
}

pub(super) fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub(super) fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

pub(super) fn default_score_min() -> f32 {
    1.0
}

pub(super) fn default_score_max() -> f32 {
    7.83
}

pub(super) fn default_score_decimals() -> u32 {
    2
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
