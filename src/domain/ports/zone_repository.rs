//! Port for the durable danger-zone catalog.

use async_trait::async_trait;

use crate::domain::zone::{Zone, ZoneDraft};

/// Errors raised by zone repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneRepositoryError {
    /// Repository connection could not be established.
    #[error("zone repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("zone repository query failed: {message}")]
    Query { message: String },
    /// No non-deleted zone matched the identifier.
    #[error("zone not found")]
    NotFound,
}

impl ZoneRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// CRUD with soft-delete over the zone catalog.
///
/// Soft-deleted rows are invisible to every read, including `list_active`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Insert a zone and return its identifier.
    async fn create(&self, draft: &ZoneDraft) -> Result<i32, ZoneRepositoryError>;

    /// Fetch a zone by id.
    async fn read(&self, id: i32) -> Result<Zone, ZoneRepositoryError>;

    /// Overwrite a zone's mutable fields.
    async fn update(&self, id: i32, draft: &ZoneDraft) -> Result<(), ZoneRepositoryError>;

    /// Stamp `deleted_at`, hiding the zone from all reads.
    async fn soft_delete(&self, id: i32) -> Result<(), ZoneRepositoryError>;

    /// All active, non-deleted zones, most recently updated first.
    async fn list_active(&self) -> Result<Vec<Zone>, ZoneRepositoryError>;

    /// One page of non-deleted zones plus the total non-deleted count.
    async fn list_page(&self, page: u32, limit: u32)
        -> Result<(Vec<Zone>, i64), ZoneRepositoryError>;
}
