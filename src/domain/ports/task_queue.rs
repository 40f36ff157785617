//! Port for the transient webhook task queue.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::webhook::WebhookTask;

/// Errors surfaced by the queue adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskQueueError {
    /// Queue infrastructure is unavailable.
    #[error("task queue is unavailable: {message}")]
    Unavailable { message: String },
    /// A task envelope could not be encoded or decoded.
    #[error("task envelope codec failure: {message}")]
    Codec { message: String },
}

impl TaskQueueError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

/// FIFO task transport with at-most-once delivery. The outbox scanner makes
/// up for dropped tasks, yielding at-least-once attempts overall.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a task to the queue.
    async fn publish(&self, task: &WebhookTask) -> Result<(), TaskQueueError>;

    /// Remove the oldest task, waiting up to `timeout`. An empty timeout is
    /// `Ok(None)`, not an error.
    async fn blocking_pop(
        &self,
        timeout: Duration,
    ) -> Result<Option<WebhookTask>, TaskQueueError>;
}
