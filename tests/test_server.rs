//! Integration test: Server API endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use iris_mlops::data;
use iris_mlops::server::{create_router, AppState, LoadedModel, ServerConfig};
use iris_mlops::training::{Trainer, TrainerConfig};

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        registry_dir: "/tmp/iris-test-registry".to_string(),
        model_name: "iris-classifier".to_string(),
    }
}

fn test_app(model: Option<LoadedModel>) -> axum::Router {
    let state = Arc::new(AppState::new(test_config(), model));
    create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 1234))))
}

fn trained_model() -> LoadedModel {
    let df = data::sample_dataset(42).unwrap();
    let trainer = Trainer::new(TrainerConfig::default());
    let candidate = trainer.fit_all(&df).unwrap().remove(0);
    LoadedModel {
        model: candidate.model,
        name: "iris-classifier".to_string(),
        version: 1,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_status_message() {
    let app = test_app(None);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body, json!({ "status": "Iris model API is running." }));
}

#[tokio::test]
async fn test_root_is_idempotent() {
    for _ in 0..3 {
        let app = test_app(None);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "Iris model API is running.");
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Some(trained_model()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["model"]["version"], 1);
}

#[tokio::test]
async fn test_predict_setosa() {
    let app = test_app(Some(trained_model()));
    let payload = json!({
        "sepal_length_cm": 5.1,
        "sepal_width_cm": 3.5,
        "petal_length_cm": 1.4,
        "petal_width_cm": 0.2,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["class_name"], "Setosa");
}

#[tokio::test]
async fn test_predict_missing_field_rejected() {
    let app = test_app(Some(trained_model()));
    let payload = json!({
        "sepal_length_cm": 5.1,
        "sepal_width_cm": 3.5,
        "petal_length_cm": 1.4,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_non_numeric_rejected() {
    let app = test_app(Some(trained_model()));
    let payload = json!({
        "sepal_length_cm": "big",
        "sepal_width_cm": 3.5,
        "petal_length_cm": 1.4,
        "petal_width_cm": 0.2,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_without_model_returns_503() {
    let app = test_app(None);
    let payload = json!({
        "sepal_length_cm": 5.1,
        "sepal_width_cm": 3.5,
        "petal_length_cm": 1.4,
        "petal_width_cm": 0.2,
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = test_app(None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/models")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predict_get_method_not_allowed() {
    let app = test_app(None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/predict")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
