//! extvet-rv library interface
//!
//! Exposes the service internals for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::providers::ProviderRegistry;
use crate::services::{Catalog, DecisionEngine, DecisionLog};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Classification catalog (static after startup)
    pub catalog: Arc<Catalog>,
    /// Active AI provider plus default credential
    pub registry: Arc<ProviderRegistry>,
    /// Recorded decisions for the review surface
    pub decision_log: DecisionLog,
    /// Pipeline orchestrator
    pub engine: DecisionEngine,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last AI pipeline error for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(catalog: Catalog, registry: ProviderRegistry) -> Self {
        let catalog = Arc::new(catalog);
        let registry = Arc::new(registry);
        let decision_log = DecisionLog::new();
        let last_error = Arc::new(RwLock::new(None));
        let engine = DecisionEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&registry),
            decision_log.clone(),
            Arc::clone(&last_error),
        );

        Self {
            catalog,
            registry,
            decision_log,
            engine,
            startup_time: Utc::now(),
            last_error,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::request_routes())
        .merge(api::settings_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
