//! Decision tree classifier

use crate::error::{IrisError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the majority class
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Information entropy
    Entropy,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered at splits; `None` means all
    pub feature_subset: Option<Vec<usize>>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Number of features seen at fit time
    n_features: usize,
    /// Classes seen at fit time
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            feature_subset: None,
            criterion: Criterion::Gini,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Restrict splits to a subset of features
    pub fn with_feature_subset(mut self, features: Vec<usize>) -> Self {
        self.feature_subset = Some(features);
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(IrisError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples < self.min_samples_split {
            return Err(IrisError::ValidationError(format!(
                "Need at least {} samples, got {}",
                self.min_samples_split, n_samples
            )));
        }

        self.n_features = n_features;

        let mut classes: Vec<f64> = y.iter().copied().collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();
        self.classes = classes;

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
    ) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || self.is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf { value: Self::majority_class(&y_subset), n_samples };
        }

        if let Some((best_feature, best_threshold)) = self.find_best_split(x, y, indices) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, best_feature]] <= best_threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf { value: Self::majority_class(&y_subset), n_samples };
            }

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1));

            TreeNode::Split {
                feature_idx: best_feature,
                threshold: best_threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf { value: Self::majority_class(&y_subset), n_samples }
        }
    }

    fn candidate_features(&self, n_features: usize) -> Vec<usize> {
        match &self.feature_subset {
            Some(subset) => subset.iter().copied().filter(|&f| f < n_features).collect(),
            None => (0..n_features).collect(),
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64)> {
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = self.impurity(&y_subset);
        let n = indices.len() as f64;

        let mut best_gain = 0.0f64;
        let mut best: Option<(usize, f64)> = None;

        for feature_idx in self.candidate_features(x.ncols()) {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_counts: HashMap<i64, usize> = HashMap::new();
                let mut right_counts: HashMap<i64, usize> = HashMap::new();
                let mut left_count = 0usize;
                let mut right_count = 0usize;

                for &idx in indices {
                    let class = y[idx].round() as i64;
                    if x[[idx, feature_idx]] <= threshold {
                        left_count += 1;
                        *left_counts.entry(class).or_insert(0) += 1;
                    } else {
                        right_count += 1;
                        *right_counts.entry(class).or_insert(0) += 1;
                    }
                }

                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let weighted_impurity = (left_count as f64
                    * self.impurity_from_counts(left_count, &left_counts)
                    + right_count as f64 * self.impurity_from_counts(right_count, &right_counts))
                    / n;

                let gain = parent_impurity - weighted_impurity;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, threshold));
                }
            }
        }

        best
    }

    fn impurity_from_counts(&self, count: usize, class_counts: &HashMap<i64, usize>) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        match self.criterion {
            Criterion::Gini => {
                let mut gini = 1.0;
                for &c in class_counts.values() {
                    let p = c as f64 / n;
                    gini -= p * p;
                }
                gini
            }
            Criterion::Entropy => {
                let mut entropy = 0.0;
                for &c in class_counts.values() {
                    if c > 0 {
                        let p = c as f64 / n;
                        entropy -= p * p.ln();
                    }
                }
                entropy
            }
        }
    }

    fn impurity(&self, y: &[f64]) -> f64 {
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &val in y {
            *counts.entry(val.round() as i64).or_insert(0) += 1;
        }
        self.impurity_from_counts(y.len(), &counts)
    }

    fn is_pure(&self, y: &[f64]) -> bool {
        if y.is_empty() {
            return true;
        }
        let first = y[0];
        y.iter().all(|&v| (v - first).abs() < 1e-10)
    }

    fn majority_class(y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &val in y {
            *counts.entry(val.round() as i64).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(class, _)| class as f64)
            .unwrap_or(0.0)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(IrisError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let sample = x.row(i);
                Self::predict_sample(root, &sample.to_vec())
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get tree depth
    pub fn depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::node_depth(node),
        }
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }
}
