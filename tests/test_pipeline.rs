//! Integration test: full train -> record -> promote pipeline

use std::collections::BTreeMap;

use tempfile::TempDir;

use iris_mlops::data;
use iris_mlops::error::IrisError;
use iris_mlops::registry::{promote_best, ModelRegistry, Stage};
use iris_mlops::tracking::ExperimentStore;
use iris_mlops::training::{Trainer, TrainerConfig};

const EXPERIMENT: &str = "iris-classification";
const MODEL_NAME: &str = "iris-classifier";

#[test]
fn test_end_to_end_train_record_promote() {
    let store_dir = TempDir::new().unwrap();
    let registry_dir = TempDir::new().unwrap();
    let store = ExperimentStore::open(store_dir.path()).unwrap();
    let registry = ModelRegistry::open(registry_dir.path()).unwrap();

    let df = data::sample_dataset(42).unwrap();
    let trainer = Trainer::new(TrainerConfig::default());
    let candidates = trainer.fit_all(&df).unwrap();
    assert_eq!(candidates.len(), 2);

    for candidate in &candidates {
        store
            .record_run(
                EXPERIMENT,
                &candidate.run_name,
                candidate.params.clone(),
                candidate.report.to_metric_map(),
                &candidate.model,
            )
            .unwrap();
    }

    let runs = store.list_runs(EXPERIMENT).unwrap();
    assert_eq!(runs.len(), 2);
    for run in &runs {
        assert!(run.metric("accuracy").is_some());
        assert!(run.metric("f1_score").is_some());
        assert!(run.params.contains_key("model_type"));
    }

    let entry = promote_best(&store, &registry, EXPERIMENT, MODEL_NAME).unwrap();
    assert_eq!(entry.version, 1);
    assert_eq!(entry.stage, Stage::Production);

    // The promoted artifact predicts a canonical setosa sample as class 0
    let (_, model) = registry.load_stage(MODEL_NAME, Stage::Production).unwrap();
    let x = ndarray::arr2(&[[5.1, 3.5, 1.4, 0.2]]);
    let prediction = model.predict(&x).unwrap()[0].round() as i64;
    assert_eq!(prediction, 0);
    assert_eq!(data::class_name(prediction), "Setosa");
}

#[test]
fn test_repeated_promotion_archives_previous_version() {
    let store_dir = TempDir::new().unwrap();
    let registry_dir = TempDir::new().unwrap();
    let store = ExperimentStore::open(store_dir.path()).unwrap();
    let registry = ModelRegistry::open(registry_dir.path()).unwrap();

    let df = data::sample_dataset(42).unwrap();
    let trainer = Trainer::new(TrainerConfig::default());
    let candidate = trainer.fit_all(&df).unwrap().remove(0);

    store
        .record_run(
            EXPERIMENT,
            &candidate.run_name,
            candidate.params.clone(),
            candidate.report.to_metric_map(),
            &candidate.model,
        )
        .unwrap();

    let first = promote_best(&store, &registry, EXPERIMENT, MODEL_NAME).unwrap();
    let second = promote_best(&store, &registry, EXPERIMENT, MODEL_NAME).unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);

    let versions = registry.list_versions(MODEL_NAME).unwrap();
    assert_eq!(versions[0].stage, Stage::Archived);
    assert_eq!(versions[1].stage, Stage::Production);
}

#[test]
fn test_promote_with_no_runs_fails_cleanly() {
    let store_dir = TempDir::new().unwrap();
    let registry_dir = TempDir::new().unwrap();
    let store = ExperimentStore::open(store_dir.path()).unwrap();
    let registry = ModelRegistry::open(registry_dir.path()).unwrap();

    let result = promote_best(&store, &registry, EXPERIMENT, MODEL_NAME);
    assert!(matches!(result, Err(IrisError::NoRunsFound(_))));
    assert!(registry.list_versions(MODEL_NAME).unwrap().is_empty());
}

#[test]
fn test_promotion_tie_break_is_deterministic() {
    let store_dir = TempDir::new().unwrap();
    let registry_dir = TempDir::new().unwrap();
    let store = ExperimentStore::open(store_dir.path()).unwrap();
    let registry = ModelRegistry::open(registry_dir.path()).unwrap();

    let df = data::sample_dataset(42).unwrap();
    let trainer = Trainer::new(TrainerConfig::default());
    let candidate = trainer.fit_all(&df).unwrap().remove(0);

    let mut metrics = BTreeMap::new();
    metrics.insert("accuracy".to_string(), 0.9);

    let first = store
        .record_run(EXPERIMENT, "first", BTreeMap::new(), metrics.clone(), &candidate.model)
        .unwrap();
    store
        .record_run(EXPERIMENT, "second", BTreeMap::new(), metrics, &candidate.model)
        .unwrap();

    let entry = promote_best(&store, &registry, EXPERIMENT, MODEL_NAME).unwrap();
    assert_eq!(entry.source_run_id.as_deref(), Some(first.run_id.as_str()));
}

#[test]
fn test_training_is_deterministic_for_a_seed() {
    let df = data::sample_dataset(42).unwrap();
    let trainer = Trainer::new(TrainerConfig::default());

    let a = trainer.fit_all(&df).unwrap();
    let b = trainer.fit_all(&df).unwrap();

    for (ca, cb) in a.iter().zip(b.iter()) {
        assert_eq!(ca.run_name, cb.run_name);
        assert_eq!(ca.report.accuracy, cb.report.accuracy);
        assert_eq!(ca.report.f1_weighted, cb.report.f1_weighted);
    }
}
