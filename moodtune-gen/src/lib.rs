//! moodtune-gen library interface
//!
//! Mood → music brief (chat model) → generated track (music service),
//! stored per session and served back over HTTP.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{ArtifactStore, Pipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Brief → audio orchestrator
    pub pipeline: Arc<Pipeline>,
    /// Store the download route resolves against
    pub store: ArtifactStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, store: ArtifactStore) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::generate_routes())
        .merge(api::download_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
