//! Model blob persistence
//!
//! The model, scaler and encoders are written together as one bincode blob.
//! There is no version header; a blob from a different build may fail to
//! decode or decode into nonsense.

use promo_core::{CategoryEncoders, RandomForest, StandardScaler};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::Result;

/// Borrowed view written by [`save_bundle`]; field order matches [`ModelBundle`]
#[derive(Serialize)]
pub struct BundleRef<'a> {
    pub model: Option<&'a RandomForest>,
    pub scaler: &'a StandardScaler,
    pub encoders: &'a CategoryEncoders,
}

/// Owned state restored by [`load_bundle`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelBundle {
    pub model: Option<RandomForest>,
    pub scaler: StandardScaler,
    pub encoders: CategoryEncoders,
}

/// What was written by a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub bytes: usize,
    /// BLAKE3 digest of the blob, hex encoded
    pub hash: String,
}

pub fn save_bundle<P: AsRef<Path>>(bundle: &BundleRef<'_>, path: P) -> Result<SaveSummary> {
    let data = bincode::serialize(bundle)?;
    std::fs::write(path.as_ref(), &data)?;

    let hash = hex::encode(blake3::hash(&data).as_bytes());
    info!(
        "Model saved to {} ({} bytes, blake3 {})",
        path.as_ref().display(),
        data.len(),
        hash
    );

    Ok(SaveSummary {
        path: path.as_ref().to_path_buf(),
        bytes: data.len(),
        hash,
    })
}

pub fn load_bundle<P: AsRef<Path>>(path: P) -> Result<ModelBundle> {
    let data = std::fs::read(path.as_ref())?;
    let bundle: ModelBundle = bincode::deserialize(&data)?;
    info!("Model loaded from {}", path.as_ref().display());
    Ok(bundle)
}
