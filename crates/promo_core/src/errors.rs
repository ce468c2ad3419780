//! Error types for the fitted model artifacts

use thiserror::Error;

/// Errors raised by encoders, the scaler, the forest and metric helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Transform requested on an artifact that was never fitted
    #[error("{0} is not fitted")]
    NotFitted(String),

    /// Category value absent from the classes seen at fit time
    #[error("column {column}: unseen category {value:?}")]
    UnseenCategory { column: String, value: String },

    /// Row width differs from the fitted width
    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Paired inputs of different length
    #[error("length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Fit called without any samples
    #[error("cannot fit {0} on empty input")]
    EmptyInput(String),

    /// Model structure or parameters are not usable
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
