//! Promotion model processor
//!
//! Owns the three pieces of fitted state (encoders, scaler, model) and runs
//! the pipeline steps against them: load, preprocess, train, predict,
//! save and load.

use promo_core::{
    r2_score, root_mean_squared_error, CategoryEncoders, ForestParams, RandomForest,
    StandardScaler, TrainingMetrics,
};
use std::path::Path;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::dataset::{load_table, RecordTable};
use crate::errors::{Result, TrainerError};
use crate::persistence::{load_bundle, save_bundle, BundleRef, SaveSummary};
use crate::preprocess::{self, EncodingMode, ProcessedFrame};
use crate::trainer::{train_test_split, ForestTrainer, SplitConfig};

pub use crate::preprocess::TARGET_COLUMN as DEFAULT_TARGET_COLUMN;

/// Fits, evaluates and applies the promotion sales model
#[derive(Debug, Clone, Default)]
pub struct PromotionModelProcessor {
    encoders: CategoryEncoders,
    scaler: StandardScaler,
    model: Option<RandomForest>,
    forest_params: ForestParams,
    split: SplitConfig,
}

impl PromotionModelProcessor {
    /// Empty processor with default forest and split settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &PipelineConfig) -> Self {
        Self {
            forest_params: config.forest.clone(),
            split: config.split.clone(),
            ..Self::default()
        }
    }

    pub fn encoders(&self) -> &CategoryEncoders {
        &self.encoders
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> Option<&RandomForest> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Load the training and validation tables.
    ///
    /// Any failure is logged and yields `None`; callers skip the rest of the
    /// pipeline in that case.
    pub fn load_data(
        &self,
        train_location: &str,
        validation_location: &str,
    ) -> Option<(RecordTable, RecordTable)> {
        let loaded = load_table(train_location)
            .and_then(|train| load_table(validation_location).map(|validation| (train, validation)));

        match loaded {
            Ok((train, validation)) => {
                info!("Training data shape: {:?}", train.shape());
                info!("Validation data shape: {:?}", validation.shape());
                Some((train, validation))
            }
            Err(err) => {
                error!("Error loading data: {}", err);
                None
            }
        }
    }

    /// Build the feature frame for `table`.
    ///
    /// In [`EncodingMode::FitIfUnfitted`] mode, encoders that are not fitted
    /// yet are fitted on this table; fitted encoders are never refitted.
    pub fn preprocess_data(
        &mut self,
        table: &RecordTable,
        mode: EncodingMode,
    ) -> Result<(ProcessedFrame, Vec<String>)> {
        preprocess::preprocess(&mut self.encoders, table, mode)
    }

    /// Fit the scaler and a fresh forest, returning train/test metrics
    pub fn train_model(
        &mut self,
        frame: &ProcessedFrame,
        feature_columns: &[String],
        target_column: &str,
    ) -> Result<TrainingMetrics> {
        let features = frame.matrix(feature_columns)?;
        let targets = frame.dense_column(target_column)?;

        let (train_idx, test_idx) = train_test_split(features.len(), &self.split)?;

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&features)?;

        let pick_rows = |idx: &[usize]| -> Vec<Vec<f64>> {
            idx.iter().map(|&i| scaled[i].clone()).collect()
        };
        let pick_targets = |idx: &[usize]| -> Vec<f64> { idx.iter().map(|&i| targets[i]).collect() };

        let (x_train, y_train) = (pick_rows(&train_idx), pick_targets(&train_idx));
        let (x_test, y_test) = (pick_rows(&test_idx), pick_targets(&test_idx));
        info!(
            "Split {} rows into {} train / {} test",
            features.len(),
            x_train.len(),
            x_test.len()
        );

        let model =
            ForestTrainer::new(self.forest_params.clone()).fit(&x_train, &y_train, feature_columns)?;

        let train_pred = model.predict(&x_train)?;
        let test_pred = model.predict(&x_test)?;

        let metrics = TrainingMetrics {
            train_r2: r2_score(&y_train, &train_pred)?,
            test_r2: r2_score(&y_test, &test_pred)?,
            train_rmse: root_mean_squared_error(&y_train, &train_pred)?,
            test_rmse: root_mean_squared_error(&y_test, &test_pred)?,
        };

        info!("Model Training Results:");
        info!("Train R²: {:.4}", metrics.train_r2);
        info!("Test R²: {:.4}", metrics.test_r2);
        info!("Train RMSE: {:.4}", metrics.train_rmse);
        info!("Test RMSE: {:.4}", metrics.test_rmse);

        self.scaler = scaler;
        self.model = Some(model);
        Ok(metrics)
    }

    /// Predict units sold for every row of a raw table
    pub fn predict(&self, table: &RecordTable) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or(TrainerError::NotTrained)?;

        let (frame, _) = preprocess::transform(&self.encoders, table)?;
        let features = frame.matrix(model.feature_names())?;
        let scaled = self.scaler.transform(&features)?;

        Ok(model.predict(&scaled)?)
    }

    /// Feature names with their importances, most important first
    pub fn feature_importances(&self) -> Option<Vec<(String, f64)>> {
        self.model.as_ref().map(|model| {
            model
                .importance_ranking()
                .into_iter()
                .map(|(name, importance)| (name.to_string(), importance))
                .collect()
        })
    }

    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<SaveSummary> {
        let bundle = BundleRef {
            model: self.model.as_ref(),
            scaler: &self.scaler,
            encoders: &self.encoders,
        };
        save_bundle(&bundle, path)
    }

    /// Replace model, scaler and encoders with the contents of a saved blob
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bundle = load_bundle(path)?;
        self.model = bundle.model;
        self.scaler = bundle.scaler;
        self.encoders = bundle.encoders;
        Ok(())
    }
}
