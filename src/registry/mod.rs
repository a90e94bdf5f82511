//! Model registry: versioned model storage with lifecycle stages.
//!
//! Layout under the registry root:
//!
//! ```text
//! <root>/
//!   index.json          - version metadata for all registered models
//!   <model_name>/
//!     v<N>.bin          - bincode model artifact per version
//! ```

use crate::error::{IrisError, Result};
use crate::tracking::ExperimentStore;
use crate::training::TrainedModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Lifecycle stage of a registered model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Registered, not yet assigned
    None,
    /// Candidate under evaluation
    Staging,
    /// The version served in production
    Production,
    /// Retired version
    Archived,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::None => write!(f, "None"),
            Stage::Staging => write!(f, "Staging"),
            Stage::Production => write!(f, "Production"),
            Stage::Archived => write!(f, "Archived"),
        }
    }
}

/// Metadata of one registered model version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersionEntry {
    /// Registered model name
    pub name: String,
    /// Monotonically increasing version, starting at 1
    pub version: u32,
    /// Current lifecycle stage
    pub stage: Stage,
    /// Run the version was registered from, if any
    pub source_run_id: Option<String>,
    /// Path of the serialized model artifact
    pub artifact_path: PathBuf,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryIndex {
    versions: Vec<ModelVersionEntry>,
}

/// Filesystem-backed model registry
#[derive(Debug)]
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    /// Open (creating if needed) a registry rooted at the given directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Registry root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn load_index(&self) -> Result<RegistryIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(RegistryIndex::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_index(&self, index: &RegistryIndex) -> Result<()> {
        let json = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(), json)?;
        Ok(())
    }

    /// Register a new version of a model. Versions are assigned
    /// monotonically per model name, starting at 1, and are never
    /// reused.
    pub fn register(
        &self,
        name: &str,
        model: &TrainedModel,
        source_run_id: Option<String>,
    ) -> Result<ModelVersionEntry> {
        let mut index = self.load_index()?;

        let version = index
            .versions
            .iter()
            .filter(|v| v.name == name)
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;

        let model_dir = self.root.join(name);
        fs::create_dir_all(&model_dir)?;
        let artifact_path = model_dir.join(format!("v{}.bin", version));
        fs::write(&artifact_path, model.to_bytes()?)?;

        let entry = ModelVersionEntry {
            name: name.to_string(),
            version,
            stage: Stage::None,
            source_run_id,
            artifact_path,
            created_at: Utc::now(),
        };

        index.versions.push(entry.clone());
        self.save_index(&index)?;

        info!(model = name, version, "Registered model version");
        Ok(entry)
    }

    /// Transition a version to a new stage. Moving a version to
    /// `Production` demotes any other `Production` version of the same
    /// model to `Archived`, so at most one version serves at a time.
    pub fn transition(&self, name: &str, version: u32, stage: Stage) -> Result<ModelVersionEntry> {
        let mut index = self.load_index()?;

        if !index
            .versions
            .iter()
            .any(|v| v.name == name && v.version == version)
        {
            return Err(IrisError::ModelNotFound(format!("{} v{}", name, version)));
        }

        if stage == Stage::Production {
            for entry in index.versions.iter_mut() {
                if entry.name == name && entry.version != version && entry.stage == Stage::Production
                {
                    entry.stage = Stage::Archived;
                    info!(model = name, version = entry.version, "Archived prior production version");
                }
            }
        }

        let mut updated = None;
        for entry in index.versions.iter_mut() {
            if entry.name == name && entry.version == version {
                entry.stage = stage;
                updated = Some(entry.clone());
            }
        }
        self.save_index(&index)?;

        let entry = updated.ok_or_else(|| IrisError::ModelNotFound(format!("{} v{}", name, version)))?;
        info!(model = name, version, stage = %stage, "Transitioned model version");
        Ok(entry)
    }

    /// All versions of a model, in registration order
    pub fn list_versions(&self, name: &str) -> Result<Vec<ModelVersionEntry>> {
        let index = self.load_index()?;
        Ok(index
            .versions
            .into_iter()
            .filter(|v| v.name == name)
            .collect())
    }

    /// The version of a model currently at the given stage, if any
    pub fn get_stage(&self, name: &str, stage: Stage) -> Result<Option<ModelVersionEntry>> {
        let index = self.load_index()?;
        Ok(index
            .versions
            .into_iter()
            .find(|v| v.name == name && v.stage == stage))
    }

    /// Load the model artifact at a stage, erroring if no version holds it
    pub fn load_stage(&self, name: &str, stage: Stage) -> Result<(ModelVersionEntry, TrainedModel)> {
        let entry = self
            .get_stage(name, stage)?
            .ok_or_else(|| IrisError::ModelNotFound(format!("{} at stage {}", name, stage)))?;
        let bytes = fs::read(&entry.artifact_path).map_err(|e| {
            IrisError::ModelLoad(format!(
                "artifact {} unreadable: {}",
                entry.artifact_path.display(),
                e
            ))
        })?;
        let model = TrainedModel::from_bytes(&bytes)?;
        Ok((entry, model))
    }
}

/// Promote the best run of an experiment into the registry.
///
/// Selects the run with the highest `accuracy` metric; runs without the
/// metric are skipped. On a tie the earliest recorded run wins, so
/// reruns over the same data promote deterministically. The winner's
/// artifact is registered as a new version and transitioned straight to
/// `Production`.
///
/// Fails with [`IrisError::NoRunsFound`] when the experiment has no
/// usable runs; the registry is left untouched in that case.
pub fn promote_best(
    store: &ExperimentStore,
    registry: &ModelRegistry,
    experiment: &str,
    model_name: &str,
) -> Result<ModelVersionEntry> {
    let runs = store.list_runs(experiment)?;

    let mut best: Option<&crate::tracking::Run> = None;
    for run in &runs {
        let accuracy = match run.metric("accuracy") {
            Some(a) => a,
            None => continue,
        };
        // Strictly-greater comparison keeps the earliest run on ties
        let better = match best {
            None => true,
            Some(b) => accuracy > b.metric("accuracy").unwrap_or(f64::NEG_INFINITY),
        };
        if better {
            best = Some(run);
        }
    }

    let best = best.ok_or_else(|| IrisError::NoRunsFound(experiment.to_string()))?;
    let model = store.load_artifact(best)?;

    info!(
        run_id = %best.run_id,
        run = %best.run_name,
        accuracy = best.metric("accuracy").unwrap_or(f64::NAN),
        "Selected best run for promotion"
    );

    let entry = registry.register(model_name, &model, Some(best.run_id.clone()))?;
    registry.transition(model_name, entry.version, Stage::Production)
}
