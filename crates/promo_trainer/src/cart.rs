//! CART regression tree builder
//!
//! Exact-greedy squared-error splits. Thresholds are midpoints between
//! consecutive distinct feature values; ties keep the first feature and the
//! lowest threshold found.

use promo_core::forest::{Node, RegressionTree};

/// Growth limits for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Best split found for a node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Sum of squared errors of both children
    child_sse: f64,
}

/// Grows one regression tree over a row-major feature matrix
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Self {
        assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            feature_count,
        }
    }

    /// Build a tree from the rows listed in `sample` (duplicates allowed)
    pub fn build(&self, sample: &[usize]) -> RegressionTree {
        let mut nodes = Vec::new();
        if sample.is_empty() {
            nodes.push(Node::leaf(0, 0.0, 0, 0.0));
        } else {
            self.build_node(sample, 0, &mut nodes);
        }
        RegressionTree::new(nodes)
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len() as i32;
        let n = indices.len();
        let (mean, impurity) = self.mean_and_impurity(indices);

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || impurity <= f64::EPSILON
        {
            nodes.push(Node::leaf(current_idx, mean, n, impurity));
            return current_idx;
        }

        let Some(split) = self.find_best_split(indices) else {
            nodes.push(Node::leaf(current_idx, mean, n, impurity));
            return current_idx;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature_idx] <= split.threshold);

        // Reserve the slot, children are patched in after recursion
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
            n,
            impurity,
        ));

        let left = self.build_node(&left_indices, depth + 1, nodes);
        let right = self.build_node(&right_indices, depth + 1, nodes);

        let node = &mut nodes[current_idx as usize];
        node.left = left;
        node.right = right;

        current_idx
    }

    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);
        for feature_idx in 0..self.feature_count {
            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&i| (self.features[i][feature_idx], self.targets[i])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total_sum: f64 = column.iter().map(|(_, y)| y).sum();
            let total_sq: f64 = column.iter().map(|(_, y)| y * y).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 1..n {
                let (prev_value, y) = column[pos - 1];
                left_sum += y;
                left_sq += y * y;

                let value = column[pos].0;
                if value <= prev_value {
                    continue;
                }
                let left_n = pos;
                let right_n = n - pos;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let child_sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);

                if best.map_or(true, |b| child_sse < b.child_sse) {
                    let mut threshold = prev_value + (value - prev_value) / 2.0;
                    if threshold >= value {
                        threshold = prev_value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        child_sse,
                    });
                }
            }
        }

        best
    }

    fn mean_and_impurity(&self, indices: &[usize]) -> (f64, f64) {
        if indices.is_empty() {
            return (0.0, 0.0);
        }
        let n = indices.len() as f64;
        let mean = indices.iter().map(|&i| self.targets[i]).sum::<f64>() / n;
        let impurity = indices
            .iter()
            .map(|&i| (self.targets[i] - mean).powi(2))
            .sum::<f64>()
            / n;
        (mean, impurity)
    }
}
