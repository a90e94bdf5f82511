//! Request handlers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    Json,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::data::{class_name, FEATURE_COLUMNS};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Iris measurements submitted for prediction, in centimeters
#[derive(Debug, Clone, Deserialize)]
pub struct IrisFeatures {
    pub sepal_length_cm: f64,
    pub sepal_width_cm: f64,
    pub petal_length_cm: f64,
    pub petal_width_cm: f64,
}

impl IrisFeatures {
    fn as_row(&self) -> [f64; 4] {
        [
            self.sepal_length_cm,
            self.sepal_width_cm,
            self.petal_length_cm,
            self.petal_width_cm,
        ]
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_COLUMNS.iter().zip(self.as_row()) {
            if !value.is_finite() {
                return Err(ServerError::BadRequest(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Prediction response: the numeric class and its species name
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub prediction: i64,
    pub class_name: String,
}

/// GET / - liveness message
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "Iris model API is running." }))
}

/// GET /health - health and loaded-model info
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let model = state.model.as_ref().map(|m| {
        json!({
            "name": m.name,
            "version": m.version,
        })
    });
    Json(json!({
        "status": "healthy",
        "model_loaded": state.model.is_some(),
        "model": model,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /predict - classify one iris sample with the production model
pub async fn predict(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(features): Json<IrisFeatures>,
) -> Result<Json<PredictionResponse>> {
    features.validate()?;

    let loaded = state.model.as_ref().ok_or_else(|| {
        ServerError::ModelUnavailable(format!(
            "No production version of '{}' is loaded",
            state.config.model_name
        ))
    })?;

    let row = features.as_row();
    let x = Array2::from_shape_vec((1, 4), row.to_vec())
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let predictions = loaded
        .model
        .predict(&x)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    let prediction = predictions[0].round() as i64;
    let class = class_name(prediction);

    info!(
        client = %addr,
        model = %loaded.name,
        version = loaded.version,
        prediction,
        class,
        "Prediction served"
    );

    Ok(Json(PredictionResponse {
        prediction,
        class_name: class.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_finite() {
        let features = IrisFeatures {
            sepal_length_cm: f64::NAN,
            sepal_width_cm: 3.5,
            petal_length_cm: 1.4,
            petal_width_cm: 0.2,
        };
        assert!(matches!(
            features.validate(),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn test_as_row_order_matches_feature_columns() {
        let features = IrisFeatures {
            sepal_length_cm: 5.1,
            sepal_width_cm: 3.5,
            petal_length_cm: 1.4,
            petal_width_cm: 0.2,
        };
        assert_eq!(features.as_row(), [5.1, 3.5, 1.4, 0.2]);
    }
}
