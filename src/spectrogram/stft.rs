use std::f32::consts::PI;
use std::sync::Arc;

use ndarray::Array2;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Periodic Hann window (the DFT-even form used for spectral analysis).
pub(crate) fn periodic_hann(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = length as f32;
    (0..length)
        .map(|n| 0.5_f32 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

/// Number of whole frames that fit in `len` samples padded by `frame_size / 2` per side.
pub(crate) fn centered_frame_count(len: usize, frame_size: usize, hop: usize) -> usize {
    let padded = len + 2 * (frame_size / 2);
    1 + padded.saturating_sub(frame_size) / hop.max(1)
}

/// Forward STFT planner holding the window and FFT plan for one frame size.
pub(crate) struct StftPlan {
    frame_size: usize,
    hop: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl StftPlan {
    pub(crate) fn new(frame_size: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            frame_size,
            hop,
            window: periodic_hann(frame_size),
            fft: planner.plan_fft_forward(frame_size),
        }
    }

    /// Magnitudes `|X|` for bins `0..bins`, laid out as `(bins, frames)`.
    ///
    /// The signal is zero-padded by `frame_size / 2` on both sides so frame
    /// `t` is centered on sample `t * hop`.
    pub(crate) fn magnitudes(&self, samples: &[f32], bins: usize) -> Array2<f32> {
        let frames = centered_frame_count(samples.len(), self.frame_size, self.hop);
        let pad = self.frame_size / 2;
        let mut out = Array2::<f32>::zeros((bins, frames));
        let mut buf = vec![Complex::new(0.0_f32, 0.0); self.frame_size];
        let mut scratch = vec![Complex::new(0.0_f32, 0.0); self.fft.get_inplace_scratch_len()];
        for frame in 0..frames {
            let start = frame * self.hop;
            fill_windowed(&mut buf, samples, start, pad, &self.window);
            self.fft.process_with_scratch(&mut buf, &mut scratch);
            for (bin, value) in buf.iter().take(bins).enumerate() {
                out[[bin, frame]] = value.norm();
            }
        }
        out
    }
}

/// Copy one window of the virtually padded signal into `target`.
fn fill_windowed(
    target: &mut [Complex<f32>],
    samples: &[f32],
    padded_start: usize,
    pad: usize,
    window: &[f32],
) {
    for (i, cell) in target.iter_mut().enumerate() {
        let src = (padded_start + i)
            .checked_sub(pad)
            .and_then(|idx| samples.get(idx))
            .copied()
            .unwrap_or(0.0);
        let src = if src.is_finite() { src } else { 0.0 };
        *cell = Complex::new(src * window[i], 0.0);
    }
}
