//! Domain ports for the hexagonal boundary.
//!
//! Each port pairs an async trait with a small error enum whose constructor
//! helpers accept anything `Into<String>`. Adapters map driver errors into
//! these shapes; nothing below this boundary leaks upward.

mod check_repository;
mod task_queue;
mod webhook_repository;
mod webhook_sender;
mod zone_cache;
mod zone_repository;

pub use check_repository::{CheckRepository, CheckRepositoryError};
#[cfg(test)]
pub use check_repository::MockCheckRepository;
pub use task_queue::{TaskQueue, TaskQueueError};
#[cfg(test)]
pub use task_queue::MockTaskQueue;
pub use webhook_repository::{WebhookRepository, WebhookRepositoryError};
#[cfg(test)]
pub use webhook_repository::MockWebhookRepository;
pub use webhook_sender::{WebhookDeliveryError, WebhookSender};
#[cfg(test)]
pub use webhook_sender::MockWebhookSender;
pub use zone_cache::{ZoneCache, ZoneCacheError};
#[cfg(test)]
pub use zone_cache::MockZoneCache;
pub use zone_repository::{ZoneRepository, ZoneRepositoryError};
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
