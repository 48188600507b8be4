/// Average interleaved channels into `out`, sanitizing each sample.
pub(crate) fn downmix_to_mono_into(out: &mut Vec<f32>, samples: &[f32], channels: u16) {
    let channels = channels.max(1) as usize;
    out.clear();
    if channels == 1 {
        out.extend(samples.iter().copied().map(sanitize_sample));
        return;
    }
    out.reserve(samples.len() / channels);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().copied().map(sanitize_sample).sum();
        out.push(sum / channels as f32);
    }
}

pub(crate) fn sanitize_sample(sample: f32) -> f32 {
    if !sample.is_finite() {
        return 0.0;
    }
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped != 0.0 && clamped.abs() < f32::MIN_POSITIVE {
        0.0
    } else {
        clamped
    }
}

/// Zero-pad the tail or drop the excess tail so `samples.len() == target_len`.
pub fn fit_to_length(samples: &mut Vec<f32>, target_len: usize) {
    if samples.len() > target_len {
        samples.truncate(target_len);
    } else {
        samples.resize(target_len, 0.0);
    }
}
