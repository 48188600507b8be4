//! Prediction service composing decode, spectrogram, model and rescaling.
//!
//! Built once from a [`ServiceConfig`] and shared by reference. The model is
//! guarded by a mutex so a single service can be used from several threads.

mod response;

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::audio::{AudioLoader, Waveform};
use crate::config::{AudioSettings, ServiceConfig, normalize_extension};
use crate::emotion::EmotionVector;
use crate::error::PredictError;
use crate::model::{EmotionModel, ModelError};
use crate::rescale::ScoreRescaler;
use crate::spectrogram::{SpectrogramError, SpectrogramExtractor};
use crate::tensor::to_model_input;

pub use response::{
    Endpoints, ErrorResponse, HEALTH_ENDPOINT, HealthResponse, PREDICT_ENDPOINT,
    PREDICTION_MESSAGE, PredictionResponse, ServiceInfo,
};

/// Service version reported by `health` and `info`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failures while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Invalid spectrogram settings: {0}")]
    Spectrogram(#[from] SpectrogramError),
}

pub struct InferenceService {
    config: ServiceConfig,
    loader: AudioLoader,
    extractor: SpectrogramExtractor,
    rescaler: ScoreRescaler,
    model: Option<Mutex<EmotionModel>>,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("extractor", &self.extractor)
            .field("rescaler", &self.rescaler)
            .field("model_loaded", &self.model_loaded())
            .finish()
    }
}

impl InferenceService {
    /// Load the configured model and build the pipeline.
    pub fn start(config: ServiceConfig) -> Result<Self, StartupError> {
        let model = EmotionModel::load(&config.model)?;
        Self::from_parts(config, Some(model))
    }

    /// Like [`InferenceService::start`], but a model that fails to load leaves
    /// the service running without one. Invalid pipeline settings still fail.
    pub fn start_or_degrade(config: ServiceConfig) -> Result<Self, StartupError> {
        match EmotionModel::load(&config.model) {
            Ok(model) => Self::from_parts(config, Some(model)),
            Err(err) => {
                warn!("Model unavailable: {err}");
                Self::from_parts(config, None)
            }
        }
    }

    /// Build the pipeline around an already constructed model, or none.
    pub fn from_parts(
        config: ServiceConfig,
        model: Option<EmotionModel>,
    ) -> Result<Self, StartupError> {
        let extractor = SpectrogramExtractor::from_settings(&config.audio)?;
        log_audio_settings(&config.audio);
        Ok(Self {
            loader: AudioLoader::new(&config.audio),
            rescaler: ScoreRescaler::from_settings(&config.scores),
            extractor,
            model: model.map(Mutex::new),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Decode `path` and predict its emotion scores.
    pub fn predict_path(&self, path: &Path) -> Result<EmotionVector, PredictError> {
        if self.model.is_none() {
            return Err(PredictError::ModelNotLoaded);
        }
        let started = Instant::now();
        let waveform = self.loader.load_path(path)?;
        debug!("Decoded waveform in {:?}", started.elapsed());
        self.predict_waveform(&waveform)
    }

    /// Predict from a waveform already at the canonical rate and length.
    pub fn predict_waveform(&self, waveform: &Waveform) -> Result<EmotionVector, PredictError> {
        let model = self.model.as_ref().ok_or(PredictError::ModelNotLoaded)?;

        let started = Instant::now();
        let spectrogram = self.extractor.extract(waveform.samples())?;
        debug!(
            "Spectrogram {:?} (max {:.1} dB) in {:?}",
            spectrogram.shape(),
            spectrogram.max_db(),
            started.elapsed()
        );

        let input = to_model_input(spectrogram.into_dyn())?;
        let started = Instant::now();
        let raw = {
            let model = model
                .lock()
                .map_err(|_| ModelError::Inference("model lock poisoned".to_string()))?;
            model.infer(input)?
        };
        debug!("Raw scores {raw:?} in {:?}", started.elapsed());
        Ok(self.rescaler.apply(raw))
    }

    /// Validate an uploaded file, predict from it and build the response.
    ///
    /// The bytes are written to a temporary file carrying the original
    /// extension; the file is removed whether prediction succeeds or not.
    pub fn predict_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PredictionResponse, PredictError> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let span = info_span!("predict", %request_id, filename);
        let _entered = span.enter();
        info!("Processing upload ({} bytes)", bytes.len());

        let upload = &self.config.upload;
        let extension = upload.allowed_extension(filename).ok_or_else(|| {
            PredictError::UnsupportedFormat {
                extension: Path::new(filename)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(normalize_extension)
                    .unwrap_or_default(),
                allowed: upload.allowed_extensions.clone(),
            }
        })?;
        let size = bytes.len() as u64;
        if size > upload.max_file_size {
            return Err(PredictError::PayloadTooLarge {
                size,
                limit: upload.max_file_size,
            });
        }
        if !self.model_loaded() {
            return Err(PredictError::ModelNotLoaded);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("moodlens-upload-").suffix(&extension);
        let mut temp = match upload.temp_dir.as_deref() {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp.write_all(bytes)?;
        temp.flush()?;
        debug!("Saved upload to {}", temp.path().display());

        let result = self.predict_path(temp.path());
        let temp_path = temp.path().to_path_buf();
        if let Err(err) = temp.close() {
            warn!("Failed to remove temp file {}: {err}", temp_path.display());
        }
        let emotions = result.inspect_err(|err| warn!("Prediction failed: {err}"))?;

        let processing_time = round_seconds(started.elapsed().as_secs_f64());
        info!("Prediction completed in {processing_time}s");
        Ok(PredictionResponse::new(filename, emotions, processing_time))
    }

    pub fn health(&self) -> HealthResponse {
        let model_loaded = self.model_loaded();
        HealthResponse {
            status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded,
            version: VERSION.to_string(),
        }
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            message: self.config.api_title.clone(),
            status: "running".to_string(),
            version: VERSION.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Preprocessing must match training; call out anything non-default.
fn log_audio_settings(audio: &AudioSettings) {
    let defaults = AudioSettings::default();
    info!(
        "Audio pipeline: {} Hz, {} s, frame {}, hop {}, drop_nyquist {}",
        audio.sample_rate,
        audio.duration_seconds,
        audio.frame_size,
        audio.hop_length,
        audio.drop_nyquist
    );
    if *audio != defaults {
        warn!(
            "Audio settings differ from the training defaults ({} Hz, {} s, frame {}, hop {}); predictions may degrade",
            defaults.sample_rate, defaults.duration_seconds, defaults.frame_size, defaults.hop_length
        );
    }
}
