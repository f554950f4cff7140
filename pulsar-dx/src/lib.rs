//! pulsar-dx library - scan diagnosis service
//!
//! Uploaded scans are fingerprinted and classified by a deterministic
//! pipeline ([`analysis`]); results are enriched from the clinical knowledge
//! base and appended to the diagnosis history.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Local};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod warmup;

pub use config::ServerConfig;
pub use engine::DiagnosisEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: DiagnosisEngine,
    pub startup_time: DateTime<Local>,
}

impl AppState {
    pub fn new(engine: DiagnosisEngine) -> Self {
        Self {
            engine,
            startup_time: Local::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::history_routes())
        .merge(api::predict_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
