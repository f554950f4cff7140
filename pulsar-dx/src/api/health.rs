//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Local;
use serde::Serialize;

use crate::AppState;

pub const ENGINE_NAME: &str = "Robust Deep Ensemble";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub server_time: String,
    pub version: String,
    pub uptime_seconds: i64,
}

/// GET / and GET /health
///
/// Answers while warm-up is still running; never touches the store.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Local::now();
    Json(HealthResponse {
        status: "online".to_string(),
        engine: ENGINE_NAME.to_string(),
        server_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (now - state.startup_time).num_seconds(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}
