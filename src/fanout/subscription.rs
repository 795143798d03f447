//! Subscriber session handle.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::registry::{Registry, SubscriberId};
use crate::reading::Message;

/// Receiving half of one subscriber queue.
///
/// Registered in the [`Registry`] for exactly as long as it is alive: it is
/// created by [`Registry::subscribe`] and deregisters itself on drop, so
/// every exit path of a stream (peer gone, write error, shutdown) cleans up.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Message>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, rx: mpsc::Receiver<Message>, registry: Arc<Registry>) -> Self {
        Self { id, rx, registry }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the registry has closed this queue and it is drained.
    /// Cancellation safe: dropping the future loses nothing.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
        tracing::debug!(subscriber = %self.id, "Subscriber disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recv_ends_after_close_all() {
        let registry = Arc::new(Registry::new());
        let mut subscription = registry.subscribe();

        registry.close_all();

        assert!(subscription.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_after_close_all_ends_immediately() {
        let registry = Arc::new(Registry::new());
        registry.close_all();

        let mut late = registry.subscribe();

        assert!(registry.is_empty());
        let ended = tokio::time::timeout(std::time::Duration::from_millis(200), late.recv())
            .await
            .expect("late subscription should end without waiting");
        assert!(ended.is_none());
    }

    #[tokio::test]
    async fn test_recv_drains_queue_before_ending() {
        let registry = Arc::new(Registry::new());
        let mut subscription = registry.subscribe();

        for (_, tx) in registry.snapshot() {
            tx.try_send(Message::from("21.5")).unwrap();
        }
        registry.close_all();

        assert_eq!(subscription.recv().await, Some(Message::from("21.5")));
        assert!(subscription.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pending_recv_is_cancellable() {
        let registry = Arc::new(Registry::new());
        let mut subscription = registry.subscribe();

        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            subscription.recv(),
        )
        .await;
        assert!(waited.is_err());

        // Still registered and usable after the cancelled wait.
        assert!(registry.contains(subscription.id()));
        assert!(subscription.try_recv().is_none());
    }
}
