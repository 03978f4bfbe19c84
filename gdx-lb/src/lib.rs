//! gdx-lb library - Library Browser module
//!
//! HTTP surface over the record cache: build-or-reuse a folder's records,
//! look up one record by identifier.

use axum::Router;
use gdx_common::RecordCache;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Normalized records of the most recently requested folder
    pub cache: Arc<RecordCache>,
}

impl AppState {
    /// Create new application state
    pub fn new(cache: Arc<RecordCache>) -> Self {
        Self { cache }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(RecordCache::new()))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::game_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Front end is served from another origin (or file://)
        .layer(CorsLayer::permissive())
}
