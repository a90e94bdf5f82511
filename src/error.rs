//! Error types for the iris-mlops pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, IrisError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum IrisError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No runs found in experiment '{0}'")]
    NoRunsFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),
}

impl From<polars::error::PolarsError> for IrisError {
    fn from(err: polars::error::PolarsError) -> Self {
        IrisError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for IrisError {
    fn from(err: serde_json::Error) -> Self {
        IrisError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for IrisError {
    fn from(err: bincode::Error) -> Self {
        IrisError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IrisError::NoRunsFound("iris-classification".to_string());
        assert_eq!(
            err.to_string(),
            "No runs found in experiment 'iris-classification'"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IrisError = io_err.into();
        assert!(matches!(err, IrisError::IoError(_)));
    }
}
