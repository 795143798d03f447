//! Ingest endpoint.

use axum::{body::Bytes, extract::State, http::HeaderMap};
use std::sync::Arc;

use crate::error::IngestError;
use crate::reading;
use crate::server::state::AppState;

/// POST /ingest - Accept one reading and publish it to every subscriber.
///
/// The `temperature` header takes priority over the body. Rejected requests
/// never reach the broadcaster.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, IngestError> {
    let message = reading::normalize(state.mode, &headers, &body).inspect_err(|e| {
        tracing::debug!(error = %e, "Ingest rejected");
    })?;

    let outcome = state.broadcaster.publish(message);
    tracing::debug!(
        delivered = outcome.delivered,
        dropped = outcome.dropped,
        "Reading ingested"
    );

    Ok("ok\n")
}
