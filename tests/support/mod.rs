#![allow(dead_code)]

pub mod encode;
pub mod env;
pub mod wav;

use moodlens::config::ServiceConfig;
use moodlens::model::{EmotionModel, EmotionNet, EmotionNetConfig};
use moodlens::service::InferenceService;

pub type TestBackend = burn::backend::NdArray;

/// Settings small enough for fast CPU inference in tests.
pub fn small_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.audio.sample_rate = 8_000;
    config.audio.duration_seconds = 2;
    config.audio.frame_size = 256;
    config.audio.hop_length = 128;
    config
}

pub fn fresh_network() -> EmotionNet<TestBackend> {
    EmotionNetConfig::emotion().init::<TestBackend>(&Default::default())
}

pub fn service_with_network(config: ServiceConfig, net: EmotionNet<TestBackend>) -> InferenceService {
    InferenceService::from_parts(config, Some(EmotionModel::from_network(net)))
        .expect("build service")
}
