//! HTTP server module for ingest, streaming, and static endpoints.
//!
//! Readings are accepted on `POST /ingest` and pushed to browsers on
//! `GET /events` as Server-Sent Events.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::fanout::Registry;
use crate::server::routes::{events, health, ingest};
use crate::server::state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Builds the application router around the given state.
pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    // Browsers on any origin may read the stream and post readings.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ingest", post(ingest::ingest))
        .route("/events", get(events::events))
        .route("/health", get(health::health_check))
        .route_service("/", ServeFile::new(config.index_path()))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the server until `shutdown` resolves.
///
/// On shutdown every open stream is closed so in-flight connections can
/// finish instead of being cut mid-write.
pub async fn run<F>(config: Config, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registry = Arc::new(Registry::new());
    let state = Arc::new(AppState::new(Arc::clone(&registry), config.mode));
    let app = router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        mode = %config.mode,
        static_dir = %config.static_dir.display(),
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!(subscribers = registry.len(), "Shutting down");
            registry.close_all();
        })
        .await
}
