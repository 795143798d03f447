//! In-process publish/subscribe fan-out.
//!
//! ```text
//!   POST /ingest ──► Broadcaster::publish()
//!                          │ snapshot()
//!                          ▼
//!                   Arc<Registry> { id -> Sender }
//!                    │ try_send   │ try_send   │ try_send
//!                    ▼            ▼            ▼
//!               Subscription  Subscription  Subscription
//!                  recv()        recv()        recv()
//!                    │            │            │
//!                    ▼            ▼            ▼
//!               GET /events   GET /events   GET /events
//! ```
//!
//! Every subscriber queue holds at most [`SUBSCRIBER_CAPACITY`] messages.
//! When a queue is full the newest message is dropped for that subscriber
//! only; the publisher never waits.

pub mod broadcaster;
pub mod registry;
pub mod subscription;

pub use broadcaster::{Broadcaster, BroadcastStats, PublishOutcome};
pub use registry::{Registry, SubscriberId};
pub use subscription::Subscription;

/// Fixed number of pending messages per subscriber.
pub const SUBSCRIBER_CAPACITY: usize = 10;
