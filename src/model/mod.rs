//! Emotion regression network and its runtime.
//!
//! The network is built once per process from a PyTorch-named checkpoint and
//! kept on the selected backend. Inference is a single forward pass over a
//! `(1, 1, freq, time)` spectrogram.

mod backend;
mod network;
mod weights;

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use ndarray::Array4;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DevicePreference, ModelSettings};
use crate::emotion::EMOTION_COUNT;
#[cfg(feature = "cuda")]
use backend::{CudaBackend, CudaBackendDevice};
use backend::{
    CpuBackend, CpuDevice, WgpuBackend, WgpuBackendDevice, init_cubecl_config, init_wgpu,
    resolve_backend,
};

pub use backend::BackendKind;
pub use network::{EmotionNet, EmotionNetConfig};
pub use weights::WeightFormat;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The checkpoint is missing, unreadable, fails its checksum or does not
    /// fit the architecture.
    #[error("Failed to load model weights from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("Inference failed: {0}")]
    Inference(String),
}

enum ModelInner {
    Cpu {
        net: EmotionNet<CpuBackend>,
        device: CpuDevice,
    },
    Wgpu {
        net: EmotionNet<WgpuBackend>,
        device: WgpuBackendDevice,
    },
    #[cfg(feature = "cuda")]
    Cuda {
        net: EmotionNet<CudaBackend>,
        device: CudaBackendDevice,
    },
}

/// Loaded emotion network bound to one compute backend.
pub struct EmotionModel {
    inner: ModelInner,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for EmotionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionModel")
            .field("backend", &self.backend())
            .field("source", &self.source)
            .finish()
    }
}

impl EmotionModel {
    /// Load weights from `settings.path` on the configured device.
    pub fn load(settings: &ModelSettings) -> Result<Self, ModelError> {
        let path = settings.path.as_path();
        if !path.is_file() {
            return Err(ModelError::Load {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        if let Some(expected) = settings.sha256.as_deref() {
            weights::verify_checksum(path, expected)?;
        }
        let kind = resolve_backend(settings.device);
        let inner = match kind {
            BackendKind::Cpu => load_cpu(path)?,
            BackendKind::Wgpu => {
                let attempt = std::panic::catch_unwind(AssertUnwindSafe(|| load_wgpu(path)));
                match attempt {
                    Ok(result) => result?,
                    Err(_) if settings.device == DevicePreference::Auto => {
                        warn!("WGPU initialization failed; falling back to CPU inference.");
                        load_cpu(path)?
                    }
                    Err(_) => {
                        return Err(ModelError::Load {
                            path: path.to_path_buf(),
                            reason: "WGPU device initialization failed".to_string(),
                        });
                    }
                }
            }
            #[cfg(feature = "cuda")]
            BackendKind::Cuda => {
                let device = CudaBackendDevice::default();
                let net = build_network::<CudaBackend>(path, &device)?;
                ModelInner::Cuda { net, device }
            }
        };
        let model = Self {
            inner,
            source: Some(path.to_path_buf()),
        };
        info!(
            "Loaded emotion model from {} on {}",
            path.display(),
            model.backend().as_str()
        );
        Ok(model)
    }

    /// Wrap an in-memory CPU network, e.g. freshly initialized or trained.
    pub fn from_network(net: EmotionNet<CpuBackend>) -> Self {
        Self {
            inner: ModelInner::Cpu {
                net,
                device: CpuDevice::default(),
            },
            source: None,
        }
    }

    pub fn backend(&self) -> BackendKind {
        match &self.inner {
            ModelInner::Cpu { .. } => BackendKind::Cpu,
            ModelInner::Wgpu { .. } => BackendKind::Wgpu,
            #[cfg(feature = "cuda")]
            ModelInner::Cuda { .. } => BackendKind::Cuda,
        }
    }

    /// Checkpoint the model was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Run one forward pass; `input` must be `(1, 1, freq, time)`.
    pub fn infer(&self, input: Array4<f32>) -> Result<[f32; EMOTION_COUNT], ModelError> {
        let (batch, channels, bins, frames) = input.dim();
        if batch != 1 || channels != 1 {
            return Err(ModelError::Inference(format!(
                "expected a single-channel batch of one, got ({batch}, {channels}, {bins}, {frames})"
            )));
        }
        let values: Vec<f32> = input.iter().copied().collect();
        let data = TensorData::new(values, [batch, channels, bins, frames]);
        match &self.inner {
            ModelInner::Cpu { net, device } => run_forward(net, device, data),
            ModelInner::Wgpu { net, device } => run_forward(net, device, data),
            #[cfg(feature = "cuda")]
            ModelInner::Cuda { net, device } => run_forward(net, device, data),
        }
    }
}

fn load_cpu(path: &Path) -> Result<ModelInner, ModelError> {
    let device = CpuDevice::default();
    let net = build_network::<CpuBackend>(path, &device)?;
    Ok(ModelInner::Cpu { net, device })
}

fn load_wgpu(path: &Path) -> Result<ModelInner, ModelError> {
    init_cubecl_config();
    let device = WgpuBackendDevice::default();
    init_wgpu(&device);
    let net = build_network::<WgpuBackend>(path, &device)?;
    Ok(ModelInner::Wgpu { net, device })
}

fn build_network<B: Backend>(path: &Path, device: &B::Device) -> Result<EmotionNet<B>, ModelError> {
    let net = EmotionNetConfig::emotion().init::<B>(device);
    weights::load_weights(net, path)
}

fn run_forward<B: Backend>(
    net: &EmotionNet<B>,
    device: &B::Device,
    data: TensorData,
) -> Result<[f32; EMOTION_COUNT], ModelError> {
    let input = Tensor::<B, 4>::from_data(data, device);
    let output = net.forward(input).into_data();
    let flat = output
        .as_slice::<f32>()
        .map_err(|err| ModelError::Inference(format!("failed to read output tensor: {err:?}")))?;
    let scores: [f32; EMOTION_COUNT] = flat.try_into().map_err(|_| {
        ModelError::Inference(format!(
            "expected {EMOTION_COUNT} outputs, got {}",
            flat.len()
        ))
    })?;
    if let Some(bad) = scores.iter().find(|value| !value.is_finite()) {
        return Err(ModelError::Inference(format!("non-finite model output {bad}")));
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn_store::{BurnToPyTorchAdapter, ModuleSnapshot, SafetensorsStore};
    use tempfile::tempdir;

    fn fresh_model() -> (EmotionNet<NdArray>, EmotionModel) {
        let device = Default::default();
        let net = EmotionNetConfig::emotion().init::<NdArray>(&device);
        (net.clone(), EmotionModel::from_network(net))
    }

    fn silent_input() -> Array4<f32> {
        Array4::from_elem((1, 1, 32, 48), -100.0)
    }

    #[test]
    fn infer_returns_eight_unit_scores() {
        let (_, model) = fresh_model();
        let scores = model.infer(silent_input()).unwrap();
        assert!(scores.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(model.backend(), BackendKind::Cpu);
    }

    #[test]
    fn repeated_inference_is_deterministic() {
        let (_, model) = fresh_model();
        let first = model.infer(silent_input()).unwrap();
        let second = model.infer(silent_input()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn batched_input_is_rejected() {
        let (_, model) = fresh_model();
        let err = model
            .infer(Array4::zeros((2, 1, 32, 48)))
            .unwrap_err();
        assert!(matches!(err, ModelError::Inference(_)));
    }

    #[test]
    fn safetensors_round_trip_reproduces_predictions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emotion.safetensors");
        let (net, model) = fresh_model();
        let mut store = SafetensorsStore::from_file(path.clone()).with_to_adapter(BurnToPyTorchAdapter);
        net.save_into(&mut store).unwrap();

        let loaded = EmotionModel::load(&ModelSettings {
            path: path.clone(),
            sha256: None,
            device: DevicePreference::Cpu,
        })
        .unwrap();
        assert_eq!(loaded.source(), Some(path.as_path()));

        let expected = model.infer(silent_input()).unwrap();
        let actual = loaded.infer(silent_input()).unwrap();
        for (a, b) in expected.iter().zip(actual.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn missing_weights_fail_to_load() {
        let dir = tempdir().unwrap();
        let err = EmotionModel::load(&ModelSettings {
            path: dir.path().join("best.pth"),
            sha256: None,
            device: DevicePreference::Cpu,
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
    }

    #[test]
    fn checksum_mismatch_blocks_loading() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emotion.safetensors");
        let (net, _) = fresh_model();
        let mut store = SafetensorsStore::from_file(path.clone()).with_to_adapter(BurnToPyTorchAdapter);
        net.save_into(&mut store).unwrap();

        let err = EmotionModel::load(&ModelSettings {
            path,
            sha256: Some("0".repeat(64)),
            device: DevicePreference::Cpu,
        })
        .unwrap_err();
        assert!(err.to_string().contains("SHA-256 mismatch"));
    }

    #[test]
    fn unknown_weight_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not weights").unwrap();
        let err = EmotionModel::load(&ModelSettings {
            path,
            sha256: None,
            device: DevicePreference::Cpu,
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
    }

    #[test]
    fn unreadable_pth_is_a_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.pth");
        std::fs::write(&path, b"this is not a torch archive").unwrap();
        let err = EmotionModel::load(&ModelSettings {
            path: path.clone(),
            sha256: None,
            device: DevicePreference::Cpu,
        })
        .unwrap_err();
        match err {
            ModelError::Load { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn checkpoint_with_another_layout_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("narrow.safetensors");
        let narrow = EmotionNetConfig::emotion()
            .with_channels([8, 16, 32, 64])
            .with_hidden(32)
            .init::<NdArray>(&Default::default());
        let mut store = SafetensorsStore::from_file(path.clone()).with_to_adapter(BurnToPyTorchAdapter);
        narrow.save_into(&mut store).unwrap();

        let err = EmotionModel::load(&ModelSettings {
            path,
            sha256: None,
            device: DevicePreference::Cpu,
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }), "{err}");
    }
}
