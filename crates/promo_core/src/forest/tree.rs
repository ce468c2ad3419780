//! Regression tree structures
//!
//! Trees are flat node arrays with node 0 as the root. Traversal goes left
//! when `features[feature_idx] <= threshold`.

use serde::{Deserialize, Serialize};

/// A regression tree node (internal or leaf)
///
/// Leaf nodes have `feature_idx == -1`, `left == right == -1` and carry the
/// mean target of their samples in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    pub threshold: f64,
    pub leaf: Option<f64>,
    /// Training samples that reached this node (bootstrap duplicates included)
    pub samples: usize,
    /// Mean squared deviation of the targets at this node
    pub impurity: f64,
}

impl Node {
    pub fn internal(
        id: i32,
        feature_idx: i32,
        threshold: f64,
        left: i32,
        right: i32,
        samples: usize,
        impurity: f64,
    ) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
            samples,
            impurity,
        }
    }

    pub fn leaf(id: i32, value: f64, samples: usize, impurity: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
            samples,
            impurity,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single fitted regression tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegressionTree {
    pub nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Predict the target for one feature row.
    ///
    /// Callers validate the tree first; a malformed tree yields 0.0.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if let Some(value) = node.leaf {
                return value;
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest leaf, root alone is depth 0
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Unnormalized weighted impurity decrease per feature
    pub fn impurity_decrease(&self, feature_count: usize) -> Vec<f64> {
        let mut decrease = vec![0.0; feature_count];

        for node in self.nodes.iter().filter(|n| !n.is_leaf()) {
            let (Some(left), Some(right)) = (
                self.nodes.get(node.left as usize),
                self.nodes.get(node.right as usize),
            ) else {
                continue;
            };
            if let Some(slot) = decrease.get_mut(node.feature_idx as usize) {
                *slot += node.samples as f64 * node.impurity
                    - left.samples as f64 * left.impurity
                    - right.samples as f64 * right.impurity;
            }
        }

        decrease
    }

    /// Validate tree structure against the expected feature count
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let len = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.leaf.is_none() {
                    return Err(format!("Leaf node {i} has no leaf value"));
                }
                continue;
            }

            if node.left <= i as i32 || node.left >= len {
                return Err(format!("Node {i} has invalid left child: {}", node.left));
            }
            if node.right <= i as i32 || node.right >= len {
                return Err(format!("Node {i} has invalid right child: {}", node.right));
            }
            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Node {i} has invalid feature index: {}",
                    node.feature_idx
                ));
            }
        }

        Ok(())
    }
}
