use flacenc::component::BitRepr;
use flacenc::error::Verify;

fn to_pcm16(samples: &[f32]) -> impl Iterator<Item = i16> + '_ {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
}

/// 16-bit mono FLAC stream.
pub fn flac_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let pcm: Vec<i32> = to_pcm16(samples).map(i32::from).collect();
    let config = flacenc::config::Encoder::default()
        .into_verified()
        .expect("default flac config");
    let source = flacenc::source::MemSource::from_samples(&pcm, 1, 16, sample_rate as usize);
    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .expect("encode flac");
    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|_| ())
        .expect("write flac stream");
    sink.as_slice().to_vec()
}

/// 80-bit IEEE extended encoding of a whole-number sample rate.
fn extended_rate(rate: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if rate == 0 {
        return out;
    }
    let shift = 31 - rate.leading_zeros();
    let exponent = 16_383 + shift as u16;
    let mantissa = (rate as u64) << (63 - shift);
    out[..2].copy_from_slice(&exponent.to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}

/// 16-bit mono AIFF file.
pub fn aiff_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data: Vec<u8> = to_pcm16(samples).flat_map(i16::to_be_bytes).collect();
    let comm_len = 18u32;
    let ssnd_len = 8 + data.len() as u32;
    let form_len = 4 + (8 + comm_len) + (8 + ssnd_len);

    let mut out = Vec::with_capacity(8 + form_len as usize);
    out.extend_from_slice(b"FORM");
    out.extend_from_slice(&form_len.to_be_bytes());
    out.extend_from_slice(b"AIFF");
    out.extend_from_slice(b"COMM");
    out.extend_from_slice(&comm_len.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&(samples.len() as u32).to_be_bytes());
    out.extend_from_slice(&16u16.to_be_bytes());
    out.extend_from_slice(&extended_rate(sample_rate));
    out.extend_from_slice(b"SSND");
    out.extend_from_slice(&ssnd_len.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&data);
    out
}
