//! Webhook outbox entries and the transient queue envelope.
//!
//! The outbox row is the durable source of truth for one notification's
//! delivery; the [`WebhookTask`] envelope is a freely discardable carrier
//! between producers and the worker. Losing a task never loses the attempt
//! because the row stays in a scannable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery state of an outbox entry.
///
/// `Delivered` and `Failed` are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookState {
    /// Awaiting dispatch; visible to the outbox scanner once due.
    InProgress,
    /// A handler has claimed the entry for one HTTP attempt.
    Processing,
    /// The endpoint acknowledged with a 2xx status.
    Delivered,
    /// The retry ceiling was reached.
    Failed,
}

/// Raised when a stored state string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown webhook state: {0}")]
pub struct UnknownWebhookState(pub String);

impl WebhookState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Processing => "processing",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }
}

impl std::str::FromStr for WebhookState {
    type Err = UnknownWebhookState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "in_progress" => Ok(Self::InProgress),
            "processing" => Ok(Self::Processing),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownWebhookState(other.to_owned())),
        }
    }
}

/// Durable record of one webhook notification attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRecord {
    pub id: i32,
    pub check_id: i32,
    pub state: WebhookState,
    pub retry_cnt: i32,
    /// The JSON body POSTed to the endpoint, stored verbatim.
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
}

/// Input for inserting an outbox row. New rows start `in_progress` with a
/// zero retry counter and `scheduled_at = now`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWebhook {
    pub check_id: i32,
    pub payload: Vec<u8>,
}

/// Transient queue envelope for one dispatch.
///
/// The payload travels as a string so the queue entry stays human-readable
/// when inspected directly in Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookTask {
    pub webhook_id: i32,
    pub check_id: i32,
    pub payload: String,
}

impl WebhookTask {
    /// Build the envelope for an outbox row.
    pub fn for_record(record: &WebhookRecord) -> Self {
        Self {
            webhook_id: record.id,
            check_id: record.check_id,
            payload: String::from_utf8_lossy(&record.payload).into_owned(),
        }
    }
}
