use std::fs::File;
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};

use super::AudioError;

/// Raw decoded audio in interleaved `f32` samples.
#[derive(Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Number of multi-channel frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }
}

/// Decode a file, using its extension as the container hint.
pub fn decode_path(path: &Path, max_seconds: Option<f32>) -> Result<DecodedAudio, AudioError> {
    let label = path.display().to_string();
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path.extension().and_then(|ext| ext.to_str());
    decode_source(Box::new(file), ext, &label, max_seconds)
}

/// Decode an in-memory buffer; `extension` may carry a leading dot.
pub fn decode_bytes(
    bytes: Vec<u8>,
    extension: Option<&str>,
    max_seconds: Option<f32>,
) -> Result<DecodedAudio, AudioError> {
    let cursor = std::io::Cursor::new(bytes);
    let ext = extension.map(|ext| ext.trim_start_matches('.'));
    decode_source(Box::new(cursor), ext, "<memory>", max_seconds)
}

fn decode_source(
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
    label: &str,
    max_seconds: Option<f32>,
) -> Result<DecodedAudio, AudioError> {
    let fail = |reason: String| AudioError::Decode {
        source_name: label.to_string(),
        reason,
    };

    let mss = MediaSourceStream::new(source, Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| fail(format!("unrecognized container: {err}")))?;
    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| fail("no audio track".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|err| fail(format!("unsupported codec: {err}")))?;

    let mut samples = Vec::new();
    let mut frame_limit: Option<usize> = None;
    loop {
        if let (Some(limit), Some(ch)) = (frame_limit, channels) {
            if samples.len() / ch.max(1) as usize >= limit {
                break;
            }
        }
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break,
            Err(Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(err) => return Err(fail(format!("packet read failed: {err}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let audio_buf = match decoder.decode(&packet) {
            Ok(audio_buf) => audio_buf,
            Err(Error::DecodeError(_)) => continue,
            Err(err) => return Err(fail(format!("decode failed: {err}"))),
        };
        let spec = *audio_buf.spec();
        if sample_rate.is_none() {
            sample_rate = Some(spec.rate);
        }
        if channels.is_none() {
            channels = Some(spec.channels.count() as u16);
        }
        if frame_limit.is_none() {
            frame_limit = frame_limit_for(max_seconds, sample_rate.unwrap_or(spec.rate));
        }
        let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        samples.extend_from_slice(sample_buf.samples());
    }

    let sample_rate = sample_rate.ok_or_else(|| fail("missing sample rate".to_string()))?;
    let channels = channels.unwrap_or(1).max(1);
    if let Some(limit) = frame_limit {
        samples.truncate(limit.saturating_mul(channels as usize));
    }
    if samples.is_empty() {
        return Err(fail("decoded 0 samples".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: sample_rate.max(1),
        channels,
    })
}

fn frame_limit_for(max_seconds: Option<f32>, sample_rate: u32) -> Option<usize> {
    max_seconds
        .filter(|limit| limit.is_finite() && *limit > 0.0)
        .map(|limit| ((limit * sample_rate as f32).ceil() as usize).max(1))
}
