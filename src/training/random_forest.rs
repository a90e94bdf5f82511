//! Random forest classifier

use crate::error::{IrisError, Result};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for the per-tree feature subset size
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

/// Random forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Feature subset strategy per tree
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random state
    pub random_state: Option<u64>,
    /// Number of features seen at fit time
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new forest with the given number of trees
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            random_state: None,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn subset_size(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(IrisError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        self.n_features = n_features;
        let subset_size = self.subset_size(n_features);
        let base_seed = self.random_state.unwrap_or(42);

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                // Bootstrap sample
                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples)
                        .map(|_| (rng.next_u64() as usize) % n_samples)
                        .collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(ndarray::Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                // Per-tree random feature subset
                let mut features: Vec<usize> = (0..n_features).collect();
                features.shuffle(&mut rng);
                features.truncate(subset_size);
                features.sort_unstable();

                let mut tree = DecisionTree::new().with_feature_subset(features);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree = tree
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf);

                tree.fit(&x_boot, &y_boot).ok();
                tree
            })
            .collect();

        self.trees = trees;
        Ok(self)
    }

    /// Make predictions by majority vote over all trees
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(IrisError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .filter_map(|tree| tree.predict(x).ok())
            .collect();

        if all_predictions.is_empty() {
            return Err(IrisError::TrainingError(
                "No tree could make predictions".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                let mut votes: HashMap<i64, usize> = HashMap::new();
                for preds in &all_predictions {
                    let class = preds[i].round() as i64;
                    *votes.entry(class).or_insert(0) += 1;
                }
                votes
                    .into_iter()
                    .max_by_key(|(_, count)| *count)
                    .map(|(class, _)| class as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Get number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
