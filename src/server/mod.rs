//! Iris Model API Server
//!
//! Serves predictions from the registered production model over a small
//! REST API. The model is loaded from the registry once at startup and
//! shared read-only across handlers; restart the server to pick up a
//! newly promoted version.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::{AppState, LoadedModel};

use crate::registry::{ModelRegistry, Stage};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub registry_dir: String,
    pub model_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            registry_dir: std::env::var("REGISTRY_DIR")
                .unwrap_or_else(|_| "./registry".to_string()),
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| "iris-classifier".to_string()),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    // Load the production model up front; the server still starts when
    // none is registered and answers /predict with 503 until one is.
    let model = match ModelRegistry::open(&config.registry_dir)
        .and_then(|registry| registry.load_stage(&config.model_name, Stage::Production))
    {
        Ok((entry, model)) => {
            info!(
                model = %entry.name,
                version = entry.version,
                "Loaded production model"
            );
            Some(LoadedModel { model, name: entry.name, version: entry.version })
        }
        Err(e) => {
            warn!(
                model = %config.model_name,
                error = %e,
                "No production model available, /predict will return 503"
            );
            None
        }
    };

    let state = Arc::new(AppState::new(config.clone(), model));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        started_at = %start_time.to_rfc3339(),
        "Iris Model API starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_name, "iris-classifier");
    }
}
