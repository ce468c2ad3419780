//! Feature standardization (zero mean, unit variance)

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Per-feature statistics learned by [`StandardScaler::fit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    /// Population standard deviation, 1.0 for constant features
    pub scale: Vec<f64>,
}

/// Standard scaler with UNFITTED / FITTED lifecycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Option<ScalerParams>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    pub fn params(&self) -> Option<&ScalerParams> {
        self.params.as_ref()
    }

    /// Number of features seen at fit time
    pub fn n_features(&self) -> Option<usize> {
        self.params.as_ref().map(|p| p.mean.len())
    }

    /// Learn mean and standard deviation of each column of `rows`
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let first = rows
            .first()
            .ok_or_else(|| CoreError::EmptyInput("scaler".to_string()))?;
        let width = first.len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            if row.len() != width {
                return Err(CoreError::FeatureMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
            for (acc, &value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = vec![0.0; width];
        for row in rows {
            for ((acc, &value), &m) in variance.iter_mut().zip(row).zip(&mean) {
                *acc += (value - m) * (value - m);
            }
        }

        let scale = variance
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < 10.0 * f64::EPSILON {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        self.params = Some(ScalerParams { mean, scale });
        Ok(())
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| CoreError::NotFitted("scaler".to_string()))?;

        if row.len() != params.mean.len() {
            return Err(CoreError::FeatureMismatch {
                expected: params.mean.len(),
                got: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(params.mean.iter().zip(&params.scale))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn fit_transform(&mut self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(rows)?;
        self.transform(rows)
    }
}
