//! PostgreSQL persistence adapters using Diesel.
//!
//! Thin adapters only: repositories translate between Diesel rows and domain
//! types, mapping every driver error to the owning port's error enum. Row
//! structs and schema definitions stay internal to this tree.

mod diesel_check_repository;
mod diesel_webhook_repository;
mod diesel_zone_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_check_repository::DieselCheckRepository;
pub use diesel_webhook_repository::DieselWebhookRepository;
pub use diesel_zone_repository::DieselZoneRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
