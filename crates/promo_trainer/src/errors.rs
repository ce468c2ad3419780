use promo_core::CoreError;
use thiserror::Error;

/// Failures while reading a table from disk or over HTTP
#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors returned by the promotion model pipeline.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column {column}, row {row}: missing value")]
    MissingValue { column: String, row: usize },

    #[error("need at least {required} samples, got {got}")]
    InsufficientSamples { required: usize, got: usize },

    #[error("model not trained yet")]
    NotTrained,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Persistence(#[from] bincode::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
