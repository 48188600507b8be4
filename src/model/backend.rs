use std::sync::OnceLock;

use burn::backend::ndarray::{NdArray, NdArrayDevice};
#[cfg(target_os = "macos")]
use burn::backend::wgpu::{self, WgpuDevice, graphics::Metal};
#[cfg(not(target_os = "macos"))]
use burn::backend::wgpu::{self, WgpuDevice, graphics::Vulkan};
#[cfg(feature = "cuda")]
use burn::backend::{Cuda, cuda::CudaDevice};

use crate::config::DevicePreference;

pub(super) type CpuDevice = NdArrayDevice;
pub(super) type WgpuBackendDevice = WgpuDevice;
#[cfg(feature = "cuda")]
pub(super) type CudaBackendDevice = CudaDevice;

pub(super) type CpuBackend = NdArray;
pub(super) type WgpuBackend = wgpu::Wgpu;
#[cfg(feature = "cuda")]
pub(super) type CudaBackend = Cuda;

/// Compute backend an [`super::EmotionModel`] runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    Wgpu,
    #[cfg(feature = "cuda")]
    Cuda,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Cpu => "cpu",
            BackendKind::Wgpu => "wgpu",
            #[cfg(feature = "cuda")]
            BackendKind::Cuda => "cuda",
        }
    }
}

static WGPU_INIT: OnceLock<()> = OnceLock::new();

/// Map the configured preference onto a backend compiled into this build.
pub(super) fn resolve_backend(preference: DevicePreference) -> BackendKind {
    match preference {
        DevicePreference::Cpu => BackendKind::Cpu,
        DevicePreference::Wgpu => BackendKind::Wgpu,
        #[cfg(feature = "cuda")]
        DevicePreference::Auto | DevicePreference::Cuda => BackendKind::Cuda,
        #[cfg(not(feature = "cuda"))]
        DevicePreference::Auto => BackendKind::Wgpu,
        #[cfg(not(feature = "cuda"))]
        DevicePreference::Cuda => {
            tracing::warn!("CUDA requested but this build lacks the `cuda` feature; using WGPU.");
            BackendKind::Wgpu
        }
    }
}

pub(super) fn init_wgpu(device: &WgpuDevice) {
    WGPU_INIT.get_or_init(|| {
        #[cfg(target_os = "macos")]
        wgpu::init_setup::<Metal>(device, Default::default());
        #[cfg(not(target_os = "macos"))]
        wgpu::init_setup::<Vulkan>(device, Default::default());
    });
}

pub(super) fn init_cubecl_config() {
    static CUBECL_CONFIG: OnceLock<()> = OnceLock::new();
    CUBECL_CONFIG.get_or_init(|| {
        let mut config = cubecl_runtime::config::GlobalConfig::default();
        config.compilation.cache = Some(cubecl_runtime::config::cache::CacheConfig::Global);
        config.autotune.cache = cubecl_runtime::config::cache::CacheConfig::Global;
        let _ = std::panic::catch_unwind(|| cubecl_runtime::config::GlobalConfig::set(config));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_preferences_are_honored() {
        assert_eq!(resolve_backend(DevicePreference::Cpu), BackendKind::Cpu);
        assert_eq!(resolve_backend(DevicePreference::Wgpu), BackendKind::Wgpu);
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn auto_and_cuda_fall_back_to_wgpu_without_cuda_feature() {
        assert_eq!(resolve_backend(DevicePreference::Auto), BackendKind::Wgpu);
        assert_eq!(resolve_backend(DevicePreference::Cuda), BackendKind::Wgpu);
    }
}
