//! End-to-end training run
//!
//! Load → summarize → preprocess → train → save → predict validation → report.
//! The model blob is written before validation prediction, so a validation
//! failure still leaves the trained model on disk.

use promo_core::TrainingMetrics;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::persistence::SaveSummary;
use crate::preprocess::EncodingMode;
use crate::processor::{PromotionModelProcessor, DEFAULT_TARGET_COLUMN};
use crate::report::ModelReport;
use crate::summary::DataSummary;

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub metrics: TrainingMetrics,
    pub saved: SaveSummary,
    pub report_path: PathBuf,
    pub validation_rows: usize,
}

/// Run the full pipeline.
///
/// Returns `Ok(None)` when the input tables could not be loaded; the failure
/// is logged and nothing is trained.
pub fn run_pipeline(config: &PipelineConfig) -> Result<Option<PipelineOutcome>> {
    config.validate()?;

    info!("Training configuration:");
    info!("  Trees: {}", config.forest.n_estimators);
    info!("  Max depth: {}", config.forest.max_depth);
    info!("  Seed: {}", config.forest.seed);
    info!("  Test size: {}", config.split.test_size);

    let mut processor = PromotionModelProcessor::with_config(config);

    let Some((train_table, validation_table)) = processor.load_data(
        &config.data.train_location,
        &config.data.validation_location,
    ) else {
        error!("Failed to load data");
        return Ok(None);
    };

    DataSummary::from_table(&train_table).log();

    info!("═══════════════════════════════════════════");
    info!("Preprocessing training data...");
    let (frame, feature_columns) =
        processor.preprocess_data(&train_table, EncodingMode::FitIfUnfitted)?;

    info!("Training model...");
    let metrics = processor.train_model(&frame, &feature_columns, DEFAULT_TARGET_COLUMN)?;

    if let Some(importances) = processor.feature_importances() {
        info!("Feature importances:");
        for (name, importance) in importances {
            info!("  {}: {:.4}", name, importance);
        }
    }

    let saved = processor.save_model(&config.output.model_path)?;

    info!("═══════════════════════════════════════════");
    info!("Predicting validation data...");
    let validation_predictions = processor.predict(&validation_table)?;
    let validation_rows = validation_predictions.len();
    info!("Predicted {} validation rows", validation_rows);

    ModelReport {
        training_metrics: metrics,
        validation_predictions,
        feature_columns,
    }
    .write_to(&config.output.report_path)?;

    Ok(Some(PipelineOutcome {
        metrics,
        saved,
        report_path: config.output.report_path.clone(),
        validation_rows,
    }))
}
