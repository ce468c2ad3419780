//! Promotion sales trainer
//!
//! Loads promotion sales tables, engineers features, fits a deterministic
//! random forest and produces predictions, a persisted model blob and a JSON
//! results report.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod persistence;
pub mod pipeline;
pub mod preprocess;
pub mod processor;
pub mod report;
pub mod summary;
pub mod trainer;

pub use config::{DataConfig, OutputConfig, PipelineConfig};
pub use dataset::{load_table, PromotionRecord, RecordTable};
pub use deterministic::LcgRng;
pub use errors::{DataError, Result, TrainerError};
pub use persistence::{ModelBundle, SaveSummary};
pub use pipeline::{run_pipeline, PipelineOutcome};
pub use preprocess::{feature_columns, EncodingMode, ProcessedFrame};
pub use processor::{PromotionModelProcessor, DEFAULT_TARGET_COLUMN};
pub use report::ModelReport;
pub use summary::DataSummary;
pub use trainer::{train_test_split, ForestTrainer, SplitConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
