//! Application state shared across handlers

use crate::training::TrainedModel;

use super::ServerConfig;

/// The production model resolved at startup
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: TrainedModel,
    pub name: String,
    pub version: u32,
}

/// Application state shared across handlers.
///
/// The model is immutable after startup, so handlers read it without
/// locking. `None` means no production version was registered when the
/// server came up.
pub struct AppState {
    pub config: ServerConfig,
    pub model: Option<LoadedModel>,
}

impl AppState {
    pub fn new(config: ServerConfig, model: Option<LoadedModel>) -> Self {
        Self { config, model }
    }
}
