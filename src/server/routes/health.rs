//! Health check endpoint.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::reading::IngestMode;
use crate::server::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: IngestMode,
    pub subscribers: usize,
    pub published: u64,
    pub dropped: u64,
    pub started_at: DateTime<Utc>,
}

/// GET /health - Liveness plus fan-out counters.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.broadcaster.stats();

    Json(HealthResponse {
        status: "ok",
        mode: state.mode,
        subscribers: stats.subscribers,
        published: stats.published,
        dropped: stats.dropped,
        started_at: state.started_at,
    })
}
