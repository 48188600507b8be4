mod support;

use burn_store::{BurnToPyTorchAdapter, ModuleSnapshot, SafetensorsStore};
use moodlens::config::DevicePreference;
use moodlens::model::ModelError;
use moodlens::service::{InferenceService, StartupError};
use support::{fresh_network, service_with_network, small_config, wav};
use tempfile::TempDir;

#[test]
fn service_started_from_saved_weights_matches_in_memory_network() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("emotion.safetensors");
    let net = fresh_network();
    let mut store = SafetensorsStore::from_file(path.clone()).with_to_adapter(BurnToPyTorchAdapter);
    net.save_into(&mut store).expect("save weights");

    let mut config = small_config();
    config.model.path = path;
    config.model.device = DevicePreference::Cpu;
    let loaded = InferenceService::start(config.clone()).expect("start service");
    let in_memory = service_with_network(config, net);
    assert!(loaded.health().model_loaded);
    assert_eq!(loaded.health().status, "healthy");

    let bytes = wav::wav_bytes(&vec![0.0; 8_000], 8_000);
    let a = loaded.predict_upload("silence.wav", &bytes).unwrap();
    let b = in_memory.predict_upload("silence.wav", &bytes).unwrap();
    assert_eq!(a.emotions, b.emotions);
}

#[test]
fn missing_weights_fail_startup_with_load_error() {
    let dir = TempDir::new().unwrap();
    let mut config = small_config();
    config.model.path = dir.path().join("best.pth");
    config.model.device = DevicePreference::Cpu;
    let err = InferenceService::start(config).unwrap_err();
    assert!(matches!(err, StartupError::Model(ModelError::Load { .. })));
}
