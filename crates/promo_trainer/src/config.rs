//! Pipeline configuration
//!
//! Every field has a default, so an empty or partial TOML file is valid.

use promo_core::ForestParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{Result, TrainerError};
use crate::trainer::SplitConfig;

pub const DEFAULT_TRAIN_URL: &str = "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/train%20%285%29-ZAEru5YR6QNcDnPve8yVIfekeEnW5k.csv";
pub const DEFAULT_VALIDATION_URL: &str = "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/validation%20%282%29-xhoc1Kd9SG51xLb8aNZ9PmrHWdIgxV.csv";

/// Input table locations (paths or URLs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub train_location: String,
    pub validation_location: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_location: DEFAULT_TRAIN_URL.to_string(),
            validation_location: DEFAULT_VALIDATION_URL.to_string(),
        }
    }
}

/// Output artifact paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub model_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("promotion_model.bin"),
            report_path: PathBuf::from("model_results.json"),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub forest: ForestParams,
    pub split: SplitConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading configuration from: {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TrainerError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.forest
            .validate()
            .map_err(|e| TrainerError::Config(e.to_string()))?;

        if !(self.split.test_size > 0.0 && self.split.test_size < 1.0) {
            return Err(TrainerError::Config(format!(
                "split.test_size must be in (0, 1), got {}",
                self.split.test_size
            )));
        }
        Ok(())
    }
}
