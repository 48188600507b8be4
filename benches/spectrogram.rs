use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use moodlens::config::AudioSettings;
use moodlens::spectrogram::SpectrogramExtractor;
use moodlens::tensor::to_model_input;

fn clip(settings: &AudioSettings) -> Vec<f32> {
    let len = settings.target_len();
    let rate = settings.sample_rate as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / rate;
            0.4 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
                + 0.1 * (2.0 * std::f32::consts::PI * 3_000.0 * t).sin()
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let settings = AudioSettings::default();
    let extractor = SpectrogramExtractor::from_settings(&settings).expect("extractor");
    let samples = clip(&settings);
    c.bench_with_input(
        BenchmarkId::new("extract", settings.target_len()),
        &samples,
        |b, samples| {
            b.iter(|| extractor.extract(black_box(samples)).expect("extract"));
        },
    );
}

fn bench_extract_to_input(c: &mut Criterion) {
    let settings = AudioSettings::default();
    let extractor = SpectrogramExtractor::from_settings(&settings).expect("extractor");
    let samples = clip(&settings);
    c.bench_function("extract_to_model_input", |b| {
        b.iter(|| {
            let spec = extractor.extract(black_box(&samples)).expect("extract");
            to_model_input(spec.into_dyn()).expect("shape")
        });
    });
}

criterion_group!(benches, bench_extract, bench_extract_to_input);
criterion_main!(benches);
