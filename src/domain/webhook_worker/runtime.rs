//! Port and runtime dependency bundles for the webhook worker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{TaskQueue, WebhookRepository, WebhookSender};

/// Port bundle required by the worker.
pub struct WebhookWorkerPorts {
    /// Durable outbox adapter.
    pub outbox: Arc<dyn WebhookRepository>,
    /// Transient task queue adapter.
    pub queue: Arc<dyn TaskQueue>,
    /// Outbound delivery adapter.
    pub sender: Arc<dyn WebhookSender>,
}

impl WebhookWorkerPorts {
    pub fn new(
        outbox: Arc<dyn WebhookRepository>,
        queue: Arc<dyn TaskQueue>,
        sender: Arc<dyn WebhookSender>,
    ) -> Self {
        Self {
            outbox,
            queue,
            sender,
        }
    }
}

/// Clock-independent sleeping abstraction for the in-handler retry delay.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
