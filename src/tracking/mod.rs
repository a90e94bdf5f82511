//! Experiment tracking: records training runs with their parameters,
//! metrics, and serialized model artifacts on the local filesystem.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/
//!   index.json          - all recorded runs, in creation order
//!   artifacts/
//!     <run_id>.bin      - bincode model artifact per run
//! ```

use crate::error::{IrisError, Result};
use crate::training::TrainedModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// One recorded training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique run identifier
    pub run_id: String,
    /// Experiment the run belongs to
    pub experiment: String,
    /// Human-readable run name
    pub run_name: String,
    /// Hyperparameters, sorted by key
    pub params: BTreeMap<String, String>,
    /// Evaluation metrics, sorted by key
    pub metrics: BTreeMap<String, f64>,
    /// Path of the serialized model artifact
    pub artifact_path: PathBuf,
    /// Recording timestamp
    pub created_at: DateTime<Utc>,
}

impl Run {
    /// Metric value by name, if recorded
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreIndex {
    runs: Vec<Run>,
}

/// Filesystem-backed experiment store
#[derive(Debug)]
pub struct ExperimentStore {
    root: PathBuf,
}

impl ExperimentStore {
    /// Open (creating if needed) a store rooted at the given directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("artifacts"))?;
        Ok(Self { root })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn load_index(&self) -> Result<StoreIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(StoreIndex::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_index(&self, index: &StoreIndex) -> Result<()> {
        let json = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(), json)?;
        Ok(())
    }

    /// Record a run: writes the model artifact, then appends the run to
    /// the index. Every call creates a new run, even for identical
    /// parameters.
    pub fn record_run(
        &self,
        experiment: &str,
        run_name: &str,
        params: BTreeMap<String, String>,
        metrics: BTreeMap<String, f64>,
        model: &TrainedModel,
    ) -> Result<Run> {
        let run_id = Uuid::new_v4().to_string();
        let artifact_path = self.root.join("artifacts").join(format!("{}.bin", run_id));

        let bytes = model.to_bytes()?;
        fs::write(&artifact_path, bytes)?;
        debug!(path = %artifact_path.display(), "Wrote model artifact");

        let run = Run {
            run_id,
            experiment: experiment.to_string(),
            run_name: run_name.to_string(),
            params,
            metrics,
            artifact_path,
            created_at: Utc::now(),
        };

        let mut index = self.load_index()?;
        index.runs.push(run.clone());
        self.save_index(&index)?;

        info!(
            run_id = %run.run_id,
            experiment = %run.experiment,
            run = %run.run_name,
            "Recorded run"
        );
        Ok(run)
    }

    /// All runs of an experiment, in creation order
    pub fn list_runs(&self, experiment: &str) -> Result<Vec<Run>> {
        let index = self.load_index()?;
        Ok(index
            .runs
            .into_iter()
            .filter(|r| r.experiment == experiment)
            .collect())
    }

    /// Load the model artifact recorded with a run
    pub fn load_artifact(&self, run: &Run) -> Result<TrainedModel> {
        let bytes = fs::read(&run.artifact_path).map_err(|e| {
            IrisError::ModelLoad(format!(
                "artifact {} unreadable: {}",
                run.artifact_path.display(),
                e
            ))
        })?;
        TrainedModel::from_bytes(&bytes)
    }
}
