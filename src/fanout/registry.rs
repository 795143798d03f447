//! Subscriber registry
//!
//! Tracks the sending half of every live subscriber queue.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::subscription::Subscription;
use super::SUBSCRIBER_CAPACITY;
use crate::reading::Message;

/// Identity of one subscriber queue.
///
/// Assigned per session, so one peer may hold many independent ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of live subscriber queues.
///
/// The lock is only held to mutate or copy the map, never while a message
/// is being delivered. Once [`Registry::close_all`] has run the registry
/// stays closed and rejects new members.
#[derive(Default)]
pub struct Registry {
    members: Mutex<HashMap<SubscriberId, mpsc::Sender<Message>>>,
    next_id: AtomicU64,
    // Only read or written while `members` is locked.
    closed: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn members(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<Message>>> {
        // Critical sections are single map operations, so a poisoned map is still consistent.
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a subscriber queue and return its new identity.
    ///
    /// After `close_all` the sender is dropped instead, so the queue is
    /// already closed when the caller starts reading it.
    pub fn add(&self, sender: mpsc::Sender<Message>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut members = self.members();
        if self.closed.load(Ordering::Relaxed) {
            tracing::debug!(subscriber = %id, "Registry closed, subscriber rejected");
            return id;
        }
        members.insert(id, sender);

        tracing::debug!(subscriber = %id, subscribers = members.len(), "Subscriber added");
        id
    }

    /// Remove a subscriber queue. Removing an unknown id is a no-op.
    pub fn remove(&self, id: SubscriberId) {
        let mut members = self.members();
        if members.remove(&id).is_some() {
            tracing::debug!(subscriber = %id, subscribers = members.len(), "Subscriber removed");
        }
    }

    /// Point-in-time copy of the membership.
    pub fn snapshot(&self) -> Vec<(SubscriberId, mpsc::Sender<Message>)> {
        self.members()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    /// Create a bounded queue, register it, and hand back the guard that
    /// owns its receiving half. Dropping the guard deregisters the queue.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let id = self.add(tx);
        Subscription::new(id, rx, Arc::clone(self))
    }

    /// Drop every member and refuse new ones. Their sessions see the end of
    /// their queue and finish.
    pub fn close_all(&self) {
        let closed = {
            let mut members = self.members();
            self.closed.store(true, Ordering::Relaxed);
            let count = members.len();
            members.clear();
            count
        };

        if closed > 0 {
            tracing::info!(subscribers = closed, "Closed all subscribers");
        }
    }

    pub fn is_closed(&self) -> bool {
        let _members = self.members();
        self.closed.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.members().contains_key(&id)
    }
}
