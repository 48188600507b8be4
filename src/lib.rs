//! Music emotion recognition: audio preprocessing and CNN inference.
/// Application directory resolution.
pub mod app_dirs;
/// Audio decoding and waveform preparation.
pub mod audio;
/// Typed settings, TOML loading and environment overrides.
pub mod config;
/// Emotion labels and score vectors.
pub mod emotion;
/// Prediction error taxonomy.
pub mod error;
/// Tracing subscriber setup.
pub mod logging;
/// Emotion network and backend runtime.
pub mod model;
/// Output rescaling.
pub mod rescale;
/// Prediction service and response payloads.
pub mod service;
/// Log-amplitude spectrogram extraction.
pub mod spectrogram;
/// Model input shape adaptation.
pub mod tensor;

pub use emotion::{EmotionLabel, EmotionVector};
pub use error::PredictError;
pub use service::InferenceService;
