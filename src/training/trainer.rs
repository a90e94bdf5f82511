//! Trainer: fits every candidate classifier on a stratified split

use crate::data;
use crate::error::{IrisError, Result};
use super::metrics::ClassificationReport;
use super::random_forest::RandomForest;
use super::softmax::SoftmaxRegression;
use super::{ClassifierSpec, TrainerConfig};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Enum holding the trained model variants served by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LogisticRegression(SoftmaxRegression),
    RandomForestClassifier(RandomForest),
}

impl TrainedModel {
    /// Predict class labels for a feature matrix
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::LogisticRegression(m) => m.predict(x),
            TrainedModel::RandomForestClassifier(m) => m.predict(x),
        }
    }

    /// Serialize the model artifact
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a model artifact
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// One fitted and evaluated candidate
#[derive(Debug, Clone)]
pub struct TrainedCandidate {
    /// Run name for the tracking store
    pub run_name: String,
    /// Hyperparameters of this candidate
    pub params: BTreeMap<String, String>,
    /// Held-out evaluation report
    pub report: ClassificationReport,
    /// The fitted model
    pub model: TrainedModel,
}

/// Fits all configured candidates and evaluates them on a held-out split
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Trainer configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit every candidate on the train partition and evaluate on the
    /// test partition.
    ///
    /// A candidate whose fit fails is logged and skipped; it does not
    /// abort the remaining candidates.
    pub fn fit_all(&self, df: &DataFrame) -> Result<Vec<TrainedCandidate>> {
        let (x, y) = data::to_matrix(df, &self.config.target_column)?;
        let (x_train, x_test, y_train, y_test) = self.stratified_split(&x, &y)?;

        info!(
            n_train = x_train.nrows(),
            n_test = x_test.nrows(),
            n_features = x.ncols(),
            "Split dataset"
        );

        let mut results = Vec::new();
        for spec in &self.config.candidates {
            let start = Instant::now();
            let model = match self.fit_candidate(spec, &x_train, &y_train) {
                Ok(model) => model,
                Err(e) => {
                    warn!(run = spec.run_name(), error = %e, "Candidate training failed, skipping");
                    continue;
                }
            };

            let y_pred = model.predict(&x_test)?;
            let report = ClassificationReport::compute(&y_test, &y_pred);

            info!(
                run = spec.run_name(),
                accuracy = report.accuracy,
                f1_score = report.f1_weighted,
                elapsed_secs = start.elapsed().as_secs_f64(),
                "Candidate trained"
            );

            results.push(TrainedCandidate {
                run_name: spec.run_name().to_string(),
                params: spec.params(),
                report,
                model,
            });
        }

        Ok(results)
    }

    fn fit_candidate(
        &self,
        spec: &ClassifierSpec,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
    ) -> Result<TrainedModel> {
        match spec {
            ClassifierSpec::LogisticRegression { max_iter } => {
                let mut model = SoftmaxRegression::new().with_max_iter(*max_iter);
                model.fit(x_train, y_train)?;
                Ok(TrainedModel::LogisticRegression(model))
            }
            ClassifierSpec::RandomForest { n_estimators, random_state } => {
                let mut model =
                    RandomForest::new(*n_estimators).with_random_state(*random_state);
                model.fit(x_train, y_train)?;
                Ok(TrainedModel::RandomForestClassifier(model))
            }
        }
    }

    /// Stratified, seeded train/test split preserving class proportions.
    ///
    /// Indices are shuffled within each class group so the held-out
    /// partition is not biased by file ordering, then each group is cut
    /// at the test fraction (at least one sample per class on each side).
    fn stratified_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_seed);

        // BTreeMap keeps class iteration order deterministic
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            class_indices.entry(label.round() as i64).or_default().push(i);
        }

        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();

        for indices in class_indices.values() {
            let mut shuffled = indices.clone();
            shuffled.shuffle(&mut rng);

            let class_test_size =
                ((shuffled.len() as f64) * self.config.test_fraction).max(1.0) as usize;
            let class_test_size = class_test_size.min(shuffled.len().saturating_sub(1));
            let split_point = shuffled.len() - class_test_size;

            train_indices.extend_from_slice(&shuffled[..split_point]);
            test_indices.extend_from_slice(&shuffled[split_point..]);
        }

        if train_indices.is_empty() || test_indices.is_empty() {
            return Err(IrisError::DataError(
                "Stratified split resulted in empty train or test set".to_string(),
            ));
        }

        let n_cols = x.ncols();
        let x_train = Array2::from_shape_fn((train_indices.len(), n_cols), |(i, j)| {
            x[[train_indices[i], j]]
        });
        let x_test = Array2::from_shape_fn((test_indices.len(), n_cols), |(i, j)| {
            x[[test_indices[i], j]]
        });
        let y_train = Array1::from_iter(train_indices.iter().map(|&i| y[i]));
        let y_test = Array1::from_iter(test_indices.iter().map(|&i| y[i]));

        Ok((x_train, x_test, y_train, y_test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_dataset;
    use std::collections::HashMap;

    #[test]
    fn test_fit_all_candidates() {
        let df = sample_dataset(42).unwrap();
        let trainer = Trainer::new(TrainerConfig::default());

        let candidates = trainer.fit_all(&df).unwrap();
        assert_eq!(candidates.len(), 2);

        for candidate in &candidates {
            assert!(
                candidate.report.accuracy > 0.8,
                "{}: accuracy {}",
                candidate.run_name,
                candidate.report.accuracy
            );
            assert!(candidate.report.f1_weighted > 0.8);
        }
    }

    #[test]
    fn test_stratified_split_preserves_classes() {
        let df = sample_dataset(42).unwrap();
        let (x, y) = crate::data::to_matrix(&df, crate::data::TARGET_COLUMN).unwrap();

        let trainer = Trainer::new(TrainerConfig::default());
        let (x_train, x_test, y_train, y_test) = trainer.stratified_split(&x, &y).unwrap();

        assert_eq!(x_train.nrows() + x_test.nrows(), 150);
        assert_eq!(x_test.nrows(), 30);

        // Every class appears in both partitions with preserved proportions
        let count = |arr: &ndarray::Array1<f64>| {
            let mut map: HashMap<i64, usize> = HashMap::new();
            for v in arr.iter() {
                *map.entry(v.round() as i64).or_insert(0) += 1;
            }
            map
        };
        let train_counts = count(&y_train);
        let test_counts = count(&y_test);
        for class in 0..3i64 {
            assert_eq!(train_counts.get(&class), Some(&40));
            assert_eq!(test_counts.get(&class), Some(&10));
        }
    }

    #[test]
    fn test_model_roundtrip_bytes() {
        let df = sample_dataset(42).unwrap();
        let trainer = Trainer::new(TrainerConfig::default());
        let candidates = trainer.fit_all(&df).unwrap();

        let model = &candidates[0].model;
        let bytes = model.to_bytes().unwrap();
        let restored = TrainedModel::from_bytes(&bytes).unwrap();

        let (x, _) = crate::data::to_matrix(&df, crate::data::TARGET_COLUMN).unwrap();
        assert_eq!(model.predict(&x).unwrap(), restored.predict(&x).unwrap());
    }
}
