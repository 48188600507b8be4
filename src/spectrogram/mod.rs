//! Log-amplitude STFT spectrogram matching the training preprocessing.
//!
//! Frames are centered (zero padding of half a window on each side), windowed
//! with a periodic Hann window, and converted to decibels relative to 1.0 with
//! an 80 dB dynamic range below the loudest bin.

mod stft;

use ndarray::{Array2, ArrayD};
use thiserror::Error;

use crate::config::AudioSettings;
use stft::{StftPlan, centered_frame_count};

/// Smallest magnitude considered before taking the logarithm.
pub const AMIN: f32 = 1e-5;
/// Dynamic range kept below the loudest bin, in dB.
pub const TOP_DB: f32 = 80.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpectrogramError {
    #[error("frame size must be at least 2, got {0}")]
    InvalidFrameSize(usize),
    #[error("hop length must be in 1..={frame_size}, got {hop}")]
    InvalidHop { hop: usize, frame_size: usize },
    #[error("frame size {frame_size} exceeds padded signal length {padded_len}")]
    SignalTooShort {
        frame_size: usize,
        padded_len: usize,
    },
}

/// dB-scaled magnitudes laid out as `(frequency bins, time frames)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram(Array2<f32>);

impl Spectrogram {
    pub fn bins(&self) -> usize {
        self.0.nrows()
    }

    pub fn frames(&self) -> usize {
        self.0.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }

    /// Loudest value in dB.
    pub fn max_db(&self) -> f32 {
        self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn into_array(self) -> Array2<f32> {
        self.0
    }

    /// Dynamic-rank view consumed by the shape adapter.
    pub fn into_dyn(self) -> ArrayD<f32> {
        self.0.into_dyn()
    }
}

/// Forward STFT + dB conversion with a fixed frame size and hop.
pub struct SpectrogramExtractor {
    frame_size: usize,
    hop_length: usize,
    drop_nyquist: bool,
    plan: StftPlan,
}

impl std::fmt::Debug for SpectrogramExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrogramExtractor")
            .field("frame_size", &self.frame_size)
            .field("hop_length", &self.hop_length)
            .field("drop_nyquist", &self.drop_nyquist)
            .finish()
    }
}

impl SpectrogramExtractor {
    pub fn new(
        frame_size: usize,
        hop_length: usize,
        drop_nyquist: bool,
    ) -> Result<Self, SpectrogramError> {
        if frame_size < 2 {
            return Err(SpectrogramError::InvalidFrameSize(frame_size));
        }
        if hop_length == 0 || hop_length > frame_size {
            return Err(SpectrogramError::InvalidHop {
                hop: hop_length,
                frame_size,
            });
        }
        Ok(Self {
            frame_size,
            hop_length,
            drop_nyquist,
            plan: StftPlan::new(frame_size, hop_length),
        })
    }

    pub fn from_settings(settings: &AudioSettings) -> Result<Self, SpectrogramError> {
        Self::new(
            settings.frame_size,
            settings.hop_length,
            settings.drop_nyquist,
        )
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Frequency bins per frame after the optional Nyquist drop.
    pub fn bins(&self) -> usize {
        let full = self.frame_size / 2 + 1;
        if self.drop_nyquist { full - 1 } else { full }
    }

    /// `(bins, frames)` produced for a signal of `n_samples` samples.
    pub fn expected_shape(&self, n_samples: usize) -> (usize, usize) {
        (
            self.bins(),
            centered_frame_count(n_samples, self.frame_size, self.hop_length),
        )
    }

    pub fn extract(&self, samples: &[f32]) -> Result<Spectrogram, SpectrogramError> {
        let pad = self.frame_size / 2;
        let padded_len = samples.len() + 2 * pad;
        if samples.is_empty() || self.frame_size > padded_len {
            return Err(SpectrogramError::SignalTooShort {
                frame_size: self.frame_size,
                padded_len,
            });
        }
        let mut spec = self.plan.magnitudes(samples, self.bins());
        amplitude_to_db_inplace(&mut spec);
        Ok(Spectrogram(spec))
    }
}

/// `20·log10(max(AMIN, x))`, then floor everything at `max - TOP_DB`.
pub fn amplitude_to_db_inplace(values: &mut Array2<f32>) {
    values.mapv_inplace(|x| 20.0 * x.max(AMIN).log10());
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return;
    }
    let floor = max - TOP_DB;
    values.mapv_inplace(|x| x.max(floor));
}
