//! Random forest trainer
//!
//! Grows the forest's trees in parallel. Each tree draws its bootstrap sample
//! from a seed derived from (forest seed, tree index), so the fitted forest
//! does not depend on thread scheduling.

use promo_core::{ForestParams, RandomForest, RegressionTree};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::{bootstrap_indices, mix_seed, shuffled_indices, LcgRng};
use crate::errors::{Result, TrainerError};

/// Held-out split settings
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Shuffle `0..n` and return `(train, test)` index sets.
///
/// The test side gets `ceil(test_size * n)` rows.
pub fn train_test_split(n: usize, config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>)> {
    if n < 2 {
        return Err(TrainerError::InsufficientSamples { required: 2, got: n });
    }

    let n_test = (config.test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainerError::InsufficientSamples {
            required: n_test + 1,
            got: n,
        });
    }

    let mut rng = LcgRng::new(config.seed);
    let mut order = shuffled_indices(n, &mut rng);
    let train = order.split_off(n_test);
    Ok((train, order))
}

/// Forest trainer
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fit a forest on row-major `features` against `targets`
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        feature_names: &[String],
    ) -> Result<RandomForest> {
        self.params.validate()?;

        let n_samples = features.len();
        if n_samples == 0 {
            return Err(TrainerError::InsufficientSamples { required: 1, got: 0 });
        }
        if targets.len() != n_samples {
            return Err(promo_core::CoreError::LengthMismatch {
                expected: n_samples,
                got: targets.len(),
            }
            .into());
        }
        if let Some(row) = features.iter().find(|row| row.len() != feature_names.len()) {
            return Err(promo_core::CoreError::FeatureMismatch {
                expected: feature_names.len(),
                got: row.len(),
            }
            .into());
        }

        info!(
            "Fitting {} trees on {} samples x {} features",
            self.params.n_estimators,
            n_samples,
            feature_names.len()
        );

        let tree_config = TreeConfig {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
        };
        let builder = CartBuilder::new(features, targets, tree_config);

        let trees: Vec<RegressionTree> = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let sample = if self.params.bootstrap {
                    let mut rng = LcgRng::new(mix_seed(self.params.seed, tree_idx as u64));
                    bootstrap_indices(n_samples, &mut rng)
                } else {
                    (0..n_samples).collect()
                };

                let tree = builder.build(&sample);
                debug!(
                    "Tree {}/{}: {} nodes, depth {}",
                    tree_idx + 1,
                    self.params.n_estimators,
                    tree.nodes.len(),
                    tree.depth()
                );
                tree
            })
            .collect();

        Ok(RandomForest::new(
            self.params.clone(),
            trees,
            feature_names.to_vec(),
        )?)
    }
}
