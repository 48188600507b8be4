use std::fs::File;
use std::io::Read;
use std::path::Path;

use burn::tensor::backend::Backend;
use burn_store::{ModuleSnapshot, PyTorchToBurnAdapter, PytorchStore, SafetensorsStore};
use sha2::{Digest, Sha256};

use super::ModelError;
use super::network::EmotionNet;

/// On-disk checkpoint layouts accepted for [`EmotionNet`] weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightFormat {
    /// `torch.save(model.state_dict())` pickle archive.
    PyTorch,
    Safetensors,
}

impl WeightFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pth" | "pt" => Some(Self::PyTorch),
            "safetensors" => Some(Self::Safetensors),
            _ => None,
        }
    }
}

/// Apply a PyTorch-named checkpoint onto `net`.
pub(super) fn load_weights<B: Backend>(
    mut net: EmotionNet<B>,
    path: &Path,
) -> Result<EmotionNet<B>, ModelError> {
    let format = WeightFormat::from_path(path).ok_or_else(|| {
        load_error(path, "expected a .pth, .pt or .safetensors weight file")
    })?;
    match format {
        WeightFormat::PyTorch => {
            let mut store = PytorchStore::from_file(path);
            net.load_from(&mut store)
                .map_err(|err| load_error(path, err.to_string()))?;
        }
        WeightFormat::Safetensors => {
            let mut store =
                SafetensorsStore::from_file(path).with_from_adapter(PyTorchToBurnAdapter);
            net.load_from(&mut store)
                .map_err(|err| load_error(path, err.to_string()))?;
        }
    }
    Ok(net)
}

/// Fail unless the file's SHA-256 equals `expected` (lowercase hex).
pub(super) fn verify_checksum(path: &Path, expected: &str) -> Result<(), ModelError> {
    let actual = sha256_file(path).map_err(|err| load_error(path, err.to_string()))?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(load_error(
            path,
            format!("SHA-256 mismatch: expected {expected}, got {actual}"),
        ));
    }
    Ok(())
}

pub(crate) fn sha256_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn load_error(path: &Path, reason: impl Into<String>) -> ModelError {
    ModelError::Load {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
