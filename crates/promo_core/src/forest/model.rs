//! Random forest regressor model

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::RegressionTree;
use crate::errors::{CoreError, Result};

/// Hyperparameters a forest was grown with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Draw a bootstrap sample per tree instead of using every row
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(CoreError::InvalidModel("n_estimators must be >= 1".into()));
        }
        if self.max_depth == 0 {
            return Err(CoreError::InvalidModel("max_depth must be >= 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(CoreError::InvalidModel("min_samples_split must be >= 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(CoreError::InvalidModel("min_samples_leaf must be >= 1".into()));
        }
        Ok(())
    }
}

/// Fitted random forest: prediction is the mean of all tree outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Assemble a forest from fitted trees, validating their structure
    pub fn new(
        params: ForestParams,
        trees: Vec<RegressionTree>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if trees.is_empty() {
            return Err(CoreError::InvalidModel("forest has no trees".into()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(feature_names.len())
                .map_err(|reason| CoreError::InvalidModel(format!("tree {i}: {reason}")))?;
        }

        let feature_importances = Self::compute_importances(&trees, feature_names.len());

        Ok(Self {
            params,
            trees,
            feature_names,
            feature_importances,
        })
    }

    /// Per-tree normalized impurity decrease, averaged and renormalized
    fn compute_importances(trees: &[RegressionTree], feature_count: usize) -> Vec<f64> {
        let mut total = vec![0.0; feature_count];

        for tree in trees {
            let decrease = tree.impurity_decrease(feature_count);
            let sum: f64 = decrease.iter().sum();
            if sum > 0.0 {
                for (acc, d) in total.iter_mut().zip(decrease) {
                    *acc += d / sum;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        total
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Normalized importances in feature order
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names paired with importances, most important first
    pub fn importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .map(String::as_str)
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    pub fn predict_row(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_count() {
            return Err(CoreError::FeatureMismatch {
                expected: self.feature_count(),
                got: features.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Predict every row in parallel, preserving row order
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.par_iter().map(|row| self.predict_row(row)).collect()
    }
}
