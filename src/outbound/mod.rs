//! Outbound adapters: persistence, cache, queue, and webhook delivery.

pub mod cache;
pub mod persistence;
pub mod queue;
pub mod redis;
pub mod webhook;
