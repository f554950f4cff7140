//! Diagnosis history listing

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use pulsar_common::db::{DiagnosisHistoryEntry, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Clamped by the store to 0..=500
    pub limit: Option<i64>,
}

/// GET /history
///
/// Most recent diagnoses first; an empty store yields `[]`.
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<DiagnosisHistoryEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let entries = state.engine.history(limit).await?;
    Ok(Json(entries))
}

pub fn history_routes() -> Router<AppState> {
    Router::new().route("/history", get(list_history))
}
