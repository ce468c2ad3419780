//! Random forest regression model
//!
//! Holds fitted trees and performs inference. Tree growing lives in the
//! trainer crate.

pub mod model;
pub mod tree;

pub use model::{ForestParams, RandomForest};
pub use tree::{Node, RegressionTree};
