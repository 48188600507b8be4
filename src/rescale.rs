//! Affine map from the network's sigmoid range to the reporting range.

use crate::config::ScoreSettings;
use crate::emotion::EmotionVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRescaler {
    min: f32,
    max: f32,
    decimals: u32,
}

impl ScoreRescaler {
    pub fn new(min: f32, max: f32, decimals: u32) -> Self {
        Self { min, max, decimals }
    }

    pub fn from_settings(settings: &ScoreSettings) -> Self {
        Self::new(settings.min, settings.max, settings.decimals)
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// `score * (max - min) + min`, unrounded.
    pub fn rescale(&self, score: f32) -> f32 {
        score * (self.max - self.min) + self.min
    }

    /// Rescale every raw output and round to the configured decimals.
    pub fn apply(&self, raw: [f32; 8]) -> EmotionVector {
        EmotionVector::new(raw).map(|score| round_to(self.rescale(score), self.decimals))
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let factor = 10_f64.powi(decimals as i32);
    ((value as f64 * factor).round() / factor) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_range_bounds() {
        let rescaler = ScoreRescaler::from_settings(&ScoreSettings::default());
        assert_eq!(rescaler.rescale(0.0), 1.0);
        assert!((rescaler.rescale(1.0) - 7.83).abs() < 1e-6);
        assert!((rescaler.rescale(0.5) - 4.415).abs() < 1e-6);
    }

    #[test]
    fn apply_rounds_every_score() {
        let rescaler = ScoreRescaler::new(1.0, 7.83, 2);
        let vector = rescaler.apply([0.0, 1.0, 0.25, 0.123, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(vector.scores()[0], 1.0);
        assert_eq!(vector.scores()[1], 7.83);
        assert_eq!(vector.scores()[2], 2.71);
        assert_eq!(vector.scores()[3], 1.84);
    }

    #[test]
    fn custom_range_is_honored() {
        let rescaler = ScoreRescaler::new(0.0, 10.0, 1);
        assert_eq!(rescaler.apply([0.25; 8]).scores(), &[2.5; 8]);
    }

    #[test]
    fn round_to_handles_zero_decimals() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.456, 2), 0.46);
    }
}
