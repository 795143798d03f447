//! Shared application state for the HTTP server.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::fanout::{Broadcaster, Registry, Subscription};
use crate::reading::IngestMode;

/// Application state shared across all handlers.
pub struct AppState {
    /// Fan-out to connected `/events` clients.
    pub broadcaster: Broadcaster,
    /// Accepted ingest encoding.
    pub mode: IngestMode,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates app state publishing into the given registry.
    pub fn new(registry: Arc<Registry>, mode: IngestMode) -> Self {
        Self {
            broadcaster: Broadcaster::new(registry),
            mode,
            started_at: Utc::now(),
        }
    }

    /// Register a new stream subscriber.
    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.broadcaster.registry()
    }
}
