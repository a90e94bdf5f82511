//! Trainer configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One candidate classifier to fit and evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierSpec {
    /// Multinomial logistic regression
    LogisticRegression { max_iter: usize },
    /// Random forest classifier
    RandomForest { n_estimators: usize, random_state: u64 },
}

impl ClassifierSpec {
    /// Run name used when recording this candidate in the tracking store.
    pub fn run_name(&self) -> &'static str {
        match self {
            ClassifierSpec::LogisticRegression { .. } => "logistic-regression",
            ClassifierSpec::RandomForest { .. } => "random-forest",
        }
    }

    /// Hyperparameters recorded alongside the run.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        match self {
            ClassifierSpec::LogisticRegression { max_iter } => {
                params.insert("model_type".to_string(), "LogisticRegression".to_string());
                params.insert("max_iter".to_string(), max_iter.to_string());
            }
            ClassifierSpec::RandomForest { n_estimators, random_state } => {
                params.insert(
                    "model_type".to_string(),
                    "RandomForestClassifier".to_string(),
                );
                params.insert("n_estimators".to_string(), n_estimators.to_string());
                params.insert("random_state".to_string(), random_state.to_string());
            }
        }
        params
    }
}

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Label column name
    pub target_column: String,
    /// Fraction of samples held out for evaluation
    pub test_fraction: f64,
    /// Seed for the stratified split and seeded candidates
    pub random_seed: u64,
    /// Candidate classifiers, fitted in order
    pub candidates: Vec<ClassifierSpec>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            target_column: crate::data::TARGET_COLUMN.to_string(),
            test_fraction: 0.2,
            random_seed: 42,
            candidates: vec![
                ClassifierSpec::LogisticRegression { max_iter: 200 },
                ClassifierSpec::RandomForest { n_estimators: 100, random_state: 42 },
            ],
        }
    }
}
