//! Broadcaster
//!
//! Fans one message out to every subscriber present at publish time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;

use super::registry::Registry;
use super::subscription::Subscription;
use crate::reading::Message;

/// Result of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Subscribers the message was queued for
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
}

/// Cumulative broadcaster counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastStats {
    pub subscribers: usize,
    pub published: u64,
    pub dropped: u64,
}

/// Publishes messages into every registered subscriber queue.
///
/// Sends are `try_send`, so a publish costs one enqueue attempt per
/// subscriber and never waits on a slow reader. A full queue keeps what it
/// already holds and the new message is dropped for that subscriber.
pub struct Broadcaster {
    registry: Arc<Registry>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Register a new subscriber with the underlying registry.
    pub fn subscribe(&self) -> Subscription {
        self.registry.subscribe()
    }

    /// Deliver `message` to the current subscribers.
    pub fn publish(&self, message: Message) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        for (id, tx) in self.registry.snapshot() {
            match tx.try_send(message.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    outcome.dropped += 1;
                    tracing::debug!(subscriber = %id, "Subscriber queue full, message dropped");
                }
                // Session is tearing down; its registry entry goes with it.
                Err(TrySendError::Closed(_)) => {}
            }
        }

        self.published.fetch_add(1, Ordering::Relaxed);
        self.dropped
            .fetch_add(outcome.dropped as u64, Ordering::Relaxed);

        tracing::trace!(
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            "Message published"
        );
        outcome
    }

    pub fn stats(&self) -> BroadcastStats {
        BroadcastStats {
            subscribers: self.registry.len(),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
