//! Thermocast - live temperature readings over Server-Sent Events.
//!
//! Readings are posted to `/ingest` and fanned out to every browser
//! connected to `/events`. Each subscriber owns a small bounded queue;
//! a subscriber that falls behind misses updates instead of slowing ingest.

pub mod config;
pub mod error;
pub mod fanout;
pub mod reading;
pub mod server;
