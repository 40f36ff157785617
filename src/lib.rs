//! Geo-alert notification service.
//!
//! Maintains a catalog of circular danger zones, answers location check-ins
//! against it, and delivers webhook notifications with at-least-once
//! semantics through a durable outbox plus a transient Redis queue.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
