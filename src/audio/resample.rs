use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Input frames handed to the resampler per call.
const CHUNK_SIZE: usize = 4096;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Band-limited resampling of mono `samples` from `input_rate` to `output_rate`.
///
/// The output holds `round(len * output_rate / input_rate)` samples and is
/// aligned with the input: the filter delay is trimmed from the head and the
/// tail is flushed out of the filter.
pub(crate) fn resample_mono(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<f32>, String> {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    if samples.is_empty() || input_rate == output_rate {
        return Ok(samples.to_vec());
    }
    let ratio = output_rate as f64 / input_rate as f64;
    let expected_len = (samples.len() as f64 * ratio).round().max(1.0) as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, 1)
        .map_err(|err| err.to_string())?;
    let delay = resampler.output_delay();
    let wanted = expected_len + delay;
    let mut out = Vec::with_capacity(wanted + CHUNK_SIZE);

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let frames = resampler
            .process(&[chunk], None)
            .map_err(|err| err.to_string())?;
        out.extend_from_slice(&frames[0]);
    }
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let frames = resampler
            .process_partial(Some(&[remainder][..]), None)
            .map_err(|err| err.to_string())?;
        out.extend_from_slice(&frames[0]);
    }
    while out.len() < wanted {
        let frames = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|err| err.to_string())?;
        if frames[0].is_empty() {
            break;
        }
        out.extend_from_slice(&frames[0]);
    }

    out.drain(..delay.min(out.len()));
    out.resize(expected_len, 0.0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn identity_rate_copies_input() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_mono(&input, 22_050, 22_050).unwrap(), input);
        assert!(resample_mono(&[], 44_100, 22_050).unwrap().is_empty());
    }

    #[test]
    fn output_length_follows_duration() {
        let input = vec![0.0; 44_100];
        assert_eq!(resample_mono(&input, 44_100, 22_050).unwrap().len(), 22_050);
        let input = vec![0.0; 48_000];
        assert_eq!(resample_mono(&input, 48_000, 22_050).unwrap().len(), 22_050);
        let input = vec![0.0; 1_000];
        assert_eq!(resample_mono(&input, 8_000, 16_000).unwrap().len(), 2_000);
    }

    #[test]
    fn passband_tone_stays_in_phase() {
        let input = tone(440.0, 44_100, 44_100);
        let output = resample_mono(&input, 44_100, 22_050).unwrap();
        let expected = tone(440.0, 22_050, 22_050);
        let worst = output[1_000..21_000]
            .iter()
            .zip(&expected[1_000..21_000])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(worst < 0.05, "max deviation {worst}");
    }
}
