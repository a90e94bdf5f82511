//! Iris MLOps - A small end-to-end classification pipeline in Rust
//!
//! Trains candidate classifiers on the iris dataset, records runs in a
//! local experiment store, promotes the best run into a versioned model
//! registry, and serves predictions from the production version over a
//! REST API.
//!
//! # Quick Start
//!
//! ```no_run
//! use iris_mlops::data;
//! use iris_mlops::training::{Trainer, TrainerConfig};
//!
//! # fn main() -> iris_mlops::error::Result<()> {
//! let df = data::sample_dataset(42)?;
//! let trainer = Trainer::new(TrainerConfig::default());
//! let candidates = trainer.fit_all(&df)?;
//! for candidate in &candidates {
//!     println!("{}: {:.4}", candidate.run_name, candidate.report.accuracy);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod registry;
pub mod server;
pub mod tracking;
pub mod training;

/// Commonly used types
pub mod prelude {
    pub use crate::data::{class_name, FEATURE_COLUMNS, TARGET_COLUMN};
    pub use crate::error::{IrisError, Result};
    pub use crate::registry::{promote_best, ModelRegistry, Stage};
    pub use crate::tracking::{ExperimentStore, Run};
    pub use crate::training::{
        ClassificationReport, ClassifierSpec, TrainedCandidate, TrainedModel, Trainer,
        TrainerConfig,
    };
}
