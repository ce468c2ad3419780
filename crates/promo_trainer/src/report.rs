//! JSON results report

use promo_core::TrainingMetrics;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::errors::Result;

/// Training metrics, validation predictions and the feature list used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub training_metrics: TrainingMetrics,
    pub validation_predictions: Vec<f64>,
    pub feature_columns: Vec<String>,
}

impl ModelReport {
    /// Pretty JSON, non-finite numbers written as `null`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Results written to {}", path.as_ref().display());
        Ok(())
    }
}
