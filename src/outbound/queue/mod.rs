//! Redis-backed webhook task queue.
//!
//! A plain list under one key: producers `LPUSH` JSON envelopes, the worker
//! `BRPOP`s them, so the oldest task is consumed first. The list offers no
//! durability; the outbox scanner restores anything lost here.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::ports::{TaskQueue, TaskQueueError};
use crate::domain::webhook::WebhookTask;
use crate::outbound::redis::RedisHandle;

/// Queue key for webhook dispatch tasks.
const WEBHOOK_QUEUE_KEY: &str = "webhooks:queue";

/// Redis implementation of the task queue port.
#[derive(Clone)]
pub struct RedisTaskQueue {
    redis: RedisHandle,
}

impl RedisTaskQueue {
    pub fn new(redis: RedisHandle) -> Self {
        Self { redis }
    }
}

fn unavailable(error: redis::RedisError) -> TaskQueueError {
    TaskQueueError::unavailable(error.to_string())
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn publish(&self, task: &WebhookTask) -> Result<(), TaskQueueError> {
        let envelope =
            serde_json::to_vec(task).map_err(|err| TaskQueueError::codec(err.to_string()))?;

        let mut conn = self.redis.connection();
        let _len: i64 = conn
            .lpush(WEBHOOK_QUEUE_KEY, envelope)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn blocking_pop(
        &self,
        timeout: Duration,
    ) -> Result<Option<WebhookTask>, TaskQueueError> {
        let mut conn = self.redis.connection();
        let reply: Option<(String, Vec<u8>)> = conn
            .brpop(WEBHOOK_QUEUE_KEY, timeout.as_secs_f64())
            .await
            .map_err(unavailable)?;

        match reply {
            None => Ok(None),
            Some((_key, envelope)) => serde_json::from_slice(&envelope)
                .map(Some)
                .map_err(|err| TaskQueueError::codec(err.to_string())),
        }
    }
}
