//! Promotion model core
//!
//! Fitted artifacts shared by training and inference:
//! - `encoding`: per-column categorical label encoders
//! - `scaling`: feature standardization
//! - `forest`: regression trees and the random forest regressor
//! - `metrics`: R² and RMSE

pub mod encoding;
pub mod errors;
pub mod forest;
pub mod metrics;
pub mod scaling;

pub use encoding::{CategoryEncoders, LabelEncoder};
pub use errors::{CoreError, Result};
pub use forest::{ForestParams, Node, RandomForest, RegressionTree};
pub use metrics::{mean_squared_error, r2_score, root_mean_squared_error, TrainingMetrics};
pub use scaling::{ScalerParams, StandardScaler};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
