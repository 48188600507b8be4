//! Audio loading: decode, downmix, resample and fit to the analysis window.

mod decode;
mod prep;
mod resample;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::AudioSettings;

pub use decode::{DecodedAudio, decode_bytes, decode_path};
pub use prep::fit_to_length;
use prep::{downmix_to_mono_into, sanitize_sample};
use resample::resample_mono;

/// Extra source audio decoded beyond the window so resampling never comes up short.
const DECODE_MARGIN_SECONDS: f32 = 1.0;

/// Errors raised while turning a file into a waveform.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The input file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The container or codec could not be parsed.
    #[error("Audio decode failed for {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
    /// The resampler rejected the rate pair or the input.
    #[error("Resampling {from} Hz to {to} Hz failed: {reason}")]
    Resample { from: u32, to: u32, reason: String },
}

/// Fixed-length mono waveform at the canonical sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Decodes audio into the fixed-length mono waveform the model was trained on.
#[derive(Debug, Clone)]
pub struct AudioLoader {
    sample_rate: u32,
    duration_seconds: u32,
}

impl AudioLoader {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            sample_rate: settings.sample_rate.max(1),
            duration_seconds: settings.duration_seconds,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Exact number of samples every loaded waveform has.
    pub fn target_len(&self) -> usize {
        self.sample_rate as usize * self.duration_seconds as usize
    }

    /// Decode a file from disk.
    pub fn load_path(&self, path: &Path) -> Result<Waveform, AudioError> {
        let decoded = decode_path(path, Some(self.decode_limit_seconds()))?;
        debug!(
            "Decoded {}: {} Hz, {} ch, {} frames",
            path.display(),
            decoded.sample_rate,
            decoded.channels,
            decoded.frames()
        );
        self.prepare(decoded)
    }

    /// Decode an in-memory upload; `extension` is a container hint.
    pub fn load_bytes(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<Waveform, AudioError> {
        let decoded = decode_bytes(bytes, extension, Some(self.decode_limit_seconds()))?;
        self.prepare(decoded)
    }

    /// Downmix, resample and pad/truncate already decoded audio.
    pub fn prepare(&self, decoded: DecodedAudio) -> Result<Waveform, AudioError> {
        let mut mono = Vec::new();
        downmix_to_mono_into(&mut mono, &decoded.samples, decoded.channels);
        let mut samples = if decoded.sample_rate == self.sample_rate {
            mono
        } else {
            resample_mono(&mono, decoded.sample_rate, self.sample_rate).map_err(|reason| {
                AudioError::Resample {
                    from: decoded.sample_rate,
                    to: self.sample_rate,
                    reason,
                }
            })?
        };
        fit_to_length(&mut samples, self.target_len());
        Ok(Waveform {
            samples,
            sample_rate: self.sample_rate,
        })
    }

    /// Build a waveform from mono samples already at the canonical rate.
    pub fn from_mono(&self, mut samples: Vec<f32>) -> Waveform {
        for sample in samples.iter_mut() {
            *sample = sanitize_sample(*sample);
        }
        fit_to_length(&mut samples, self.target_len());
        Waveform {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    fn decode_limit_seconds(&self) -> f32 {
        self.duration_seconds as f32 + DECODE_MARGIN_SECONDS
    }
}
