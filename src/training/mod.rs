//! Model training module
//!
//! Provides the two candidate classifiers for the iris pipeline:
//! - Multinomial logistic regression (softmax, batch gradient descent)
//! - Random forest (bagged decision trees with majority voting)
//!
//! The [`Trainer`] fits every configured candidate on a stratified
//! train/test split and evaluates accuracy and weighted F1 on the
//! held-out partition.

mod config;
mod trainer;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod softmax;

pub use config::{ClassifierSpec, TrainerConfig};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use metrics::ClassificationReport;
pub use random_forest::{MaxFeatures, RandomForest};
pub use softmax::SoftmaxRegression;
pub use trainer::{TrainedCandidate, TrainedModel, Trainer};
