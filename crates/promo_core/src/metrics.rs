//! Regression quality metrics

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Fit quality on the train and held-out splits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_r2: f64,
    pub test_r2: f64,
    pub train_rmse: f64,
    pub test_rmse: f64,
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(CoreError::LengthMismatch {
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(CoreError::EmptyInput("metric".to_string()));
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(sum / y_true.len() as f64)
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}

/// Coefficient of determination.
///
/// Undefined (NaN) below two samples. A constant target scores 1.0 when
/// predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.len() < 2 {
        return Ok(f64::NAN);
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() -> Result<()> {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y)?, 1.0);
        assert_eq!(root_mean_squared_error(&y, &y)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_mean_prediction_scores_zero() -> Result<()> {
        let y = [1.0, 2.0, 3.0];
        let pred = [2.0, 2.0, 2.0];
        assert!(r2_score(&y, &pred)?.abs() < 1e-12);
        assert!((mean_squared_error(&y, &pred)? - 2.0 / 3.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_rmse_value() -> Result<()> {
        let rmse = root_mean_squared_error(&[0.0, 0.0], &[3.0, 4.0])?;
        assert!((rmse - 12.5f64.sqrt()).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_constant_target() -> Result<()> {
        assert_eq!(r2_score(&[4.0, 4.0], &[4.0, 4.0])?, 1.0);
        assert_eq!(r2_score(&[4.0, 4.0], &[3.0, 4.0])?, 0.0);
        Ok(())
    }

    #[test]
    fn test_single_sample_r2_is_nan() -> Result<()> {
        assert!(r2_score(&[1.0], &[2.0])?.is_nan());
        Ok(())
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            r2_score(&[1.0, 2.0], &[1.0]),
            Err(CoreError::LengthMismatch { expected: 2, got: 1 })
        ));
    }
}
