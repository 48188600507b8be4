//! JSON payloads returned by the service.

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionVector;
use crate::error::PredictError;

pub const PREDICTION_MESSAGE: &str = "Emotion prediction completed successfully";
pub const PREDICT_ENDPOINT: &str = "POST /predict - Upload audio file to get emotion predictions";
pub const HEALTH_ENDPOINT: &str = "GET /health - Check API health";

/// Result of a successful upload prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub filename: String,
    pub emotions: EmotionVector,
    /// Wall-clock seconds, rounded to 2 decimals.
    pub processing_time: f64,
    pub message: String,
}

impl PredictionResponse {
    pub fn new(filename: impl Into<String>, emotions: EmotionVector, processing_time: f64) -> Self {
        Self {
            success: true,
            filename: filename.into(),
            emotions,
            processing_time,
            message: PREDICTION_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub predict: String,
    pub health: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            predict: PREDICT_ENDPOINT.to_string(),
            health: HEALTH_ENDPOINT.to_string(),
        }
    }
}

/// Service metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: Endpoints,
}

/// Failure payload paired with an HTTP-style status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub detail: String,
    #[serde(skip)]
    pub status_code: u16,
}

impl From<&PredictError> for ErrorResponse {
    fn from(err: &PredictError) -> Self {
        let detail = if err.is_client_error() || matches!(err, PredictError::ModelNotLoaded) {
            err.to_string()
        } else {
            format!("Prediction failed: {err}")
        };
        Self {
            success: false,
            error: err.kind().to_string(),
            detail,
            status_code: err.status_code(),
        }
    }
}
