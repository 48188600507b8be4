//! Error taxonomy for a single prediction request.

use thiserror::Error;

use crate::audio::AudioError;
use crate::model::ModelError;
use crate::spectrogram::SpectrogramError;
use crate::tensor::ShapeError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Unsupported file format '{extension}'. Allowed formats: {}", allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },
    #[error("File is {size} bytes; the limit is {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error(transparent)]
    Decode(#[from] AudioError),
    #[error(transparent)]
    Spectrogram(#[from] SpectrogramError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Inference(#[from] ModelError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PredictError {
    /// HTTP-style status: 400/413 for client mistakes, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            PredictError::UnsupportedFormat { .. } => 400,
            PredictError::PayloadTooLarge { .. } => 413,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Only transient I/O failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PredictError::Io(_))
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::UnsupportedFormat { .. } => "unsupported_format",
            PredictError::PayloadTooLarge { .. } => "payload_too_large",
            PredictError::ModelNotLoaded => "model_not_loaded",
            PredictError::Decode(_) => "decode",
            PredictError::Spectrogram(_) => "spectrogram",
            PredictError::Shape(_) => "shape",
            PredictError::Inference(_) => "inference",
            PredictError::Io(_) => "io",
        }
    }
}
