//! Port for the durable webhook outbox.

use async_trait::async_trait;

use crate::domain::webhook::{NewWebhook, WebhookRecord, WebhookState};

/// Errors raised by outbox repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookRepositoryError {
    /// Repository connection could not be established.
    #[error("webhook repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("webhook repository query failed: {message}")]
    Query { message: String },
    /// No outbox row matched the identifier.
    #[error("webhook not found")]
    NotFound,
}

impl WebhookRepositoryError {
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

/// Outbox lifecycle operations.
///
/// Invariants the adapter must uphold:
/// - new rows start `in_progress` with `retry_cnt = 0` and `scheduled_at = now`;
/// - `update_state` to `in_progress` re-anchors
///   `scheduled_at = now + retry_cnt × 1 minute`, other states leave it alone;
/// - `mark_delivered` matches on id alone, so repeating it on an
///   already-delivered row succeeds without effect.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// Insert an outbox row and return its identifier.
    async fn create(&self, webhook: &NewWebhook) -> Result<i32, WebhookRepositoryError>;

    /// Fetch an outbox row by id.
    async fn read(&self, id: i32) -> Result<WebhookRecord, WebhookRepositoryError>;

    /// Write a new state and retry counter.
    async fn update_state(
        &self,
        id: i32,
        state: WebhookState,
        retry_cnt: i32,
    ) -> Result<(), WebhookRepositoryError>;

    /// Finalise a row as delivered.
    async fn mark_delivered(&self, id: i32) -> Result<(), WebhookRepositoryError>;

    /// Up to `limit` due rows (`in_progress` with `scheduled_at <= now`),
    /// oldest schedule first.
    async fn list_in_progress(
        &self,
        limit: i64,
    ) -> Result<Vec<WebhookRecord>, WebhookRepositoryError>;
}
