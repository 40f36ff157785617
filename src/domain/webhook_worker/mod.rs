//! Asynchronous webhook dispatcher.
//!
//! The worker owns two cooperating loops: a queue consumer that handles each
//! task on its own spawned task, and an outbox scanner that republishes
//! overdue rows the queue may have dropped. Together with the durable outbox
//! this yields at-least-once delivery; receivers must be idempotent.
//!
//! There is no lease fencing between the two intake paths. The consumer and
//! scanner may dispatch the same entry concurrently; the second
//! `mark_delivered` of such a pair is a no-op on the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ports::{WebhookDeliveryError, WebhookRepositoryError};
use super::webhook::{WebhookRecord, WebhookState, WebhookTask};

mod runtime;
#[cfg(test)]
mod tests;

pub use runtime::{RetrySleeper, TokioSleeper, WebhookWorkerPorts};

/// How long one queue pop blocks before returning empty.
const QUEUE_POP_TIMEOUT: Duration = Duration::from_secs(5);
/// Cadence of the outbox recovery scan.
const OUTBOX_SCAN_PERIOD: Duration = Duration::from_secs(30);
/// Rows fetched per recovery scan.
const OUTBOX_SCAN_BATCH: i64 = 10;

/// Retry behaviour limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookWorkerConfig {
    /// Retry ceiling; an entry whose counter reaches this is finalised
    /// `failed`.
    pub max_retries: i32,
    /// In-handler pause before a retry task is republished.
    pub retry_delay: Duration,
}

/// Dual-loop webhook dispatcher over the outbox, queue, and sender ports.
pub struct WebhookWorker {
    outbox: Arc<dyn super::ports::WebhookRepository>,
    queue: Arc<dyn super::ports::TaskQueue>,
    sender: Arc<dyn super::ports::WebhookSender>,
    sleeper: Arc<dyn RetrySleeper>,
    config: WebhookWorkerConfig,
}

impl WebhookWorker {
    /// Build a worker using the tokio timer for retry pauses.
    pub fn new(ports: WebhookWorkerPorts, config: WebhookWorkerConfig) -> Self {
        Self::with_runtime(ports, Arc::new(TokioSleeper), config)
    }

    /// Build a worker with an injected sleeper.
    pub fn with_runtime(
        ports: WebhookWorkerPorts,
        sleeper: Arc<dyn RetrySleeper>,
        config: WebhookWorkerConfig,
    ) -> Self {
        Self {
            outbox: ports.outbox,
            queue: ports.queue,
            sender: ports.sender,
            sleeper,
            config,
        }
    }

    /// Start both loops. They exit at the next iteration once `shutdown` is
    /// cancelled; in-flight handlers finish their current attempt.
    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> (JoinHandle<()>, JoinHandle<()>) {
        info!("starting webhook worker");
        let consumer = tokio::spawn(Arc::clone(&self).run_queue_loop(shutdown.clone()));
        let scanner = tokio::spawn(self.run_scan_loop(shutdown));
        (consumer, scanner)
    }

    /// Loop A: blocking queue consumer.
    async fn run_queue_loop(self: Arc<Self>, shutdown: CancellationToken) {
        info!("starting queue consumer");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                popped = self.queue.blocking_pop(QUEUE_POP_TIMEOUT) => match popped {
                    Ok(Some(task)) => {
                        let worker = Arc::clone(&self);
                        tokio::spawn(async move { worker.dispatch(task).await });
                    }
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "failed to pop from queue"),
                },
            }
        }
        info!("queue consumer stopped");
    }

    /// Loop B: outbox scanner. Never mutates outbox state; it only restores
    /// tasks the queue may have dropped.
    async fn run_scan_loop(self: Arc<Self>, shutdown: CancellationToken) {
        info!("starting outbox scanner");
        let start = tokio::time::Instant::now() + OUTBOX_SCAN_PERIOD;
        let mut ticker = tokio::time::interval_at(start, OUTBOX_SCAN_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.rescue_overdue().await,
            }
        }
        info!("outbox scanner stopped");
    }

    /// Republish every due `in_progress` row from the current scan batch.
    async fn rescue_overdue(&self) {
        let records = match self.outbox.list_in_progress(OUTBOX_SCAN_BATCH).await {
            Ok(records) => records,
            Err(err) => {
                error!(error = %err, "failed to read in-progress webhooks");
                return;
            }
        };

        let now = chrono::Utc::now();
        for record in records {
            if record.scheduled_at > now {
                continue;
            }

            let task = WebhookTask::for_record(&record);
            if let Err(err) = self.queue.publish(&task).await {
                error!(error = %err, webhook_id = record.id, "failed to republish webhook task");
            } else {
                debug!(webhook_id = record.id, "overdue webhook republished");
            }
        }
    }

    /// Handle one dequeued task end to end.
    pub(crate) async fn dispatch(&self, task: WebhookTask) {
        let record = match self.outbox.read(task.webhook_id).await {
            Ok(record) => record,
            Err(err) => {
                error!(error = %err, webhook_id = task.webhook_id, "failed to load webhook");
                return;
            }
        };

        if let Err(err) = self.attempt(&record).await {
            error!(error = %err, webhook_id = record.id, "webhook dispatch failed");
        }
    }

    /// One delivery attempt: claim the row, POST, then finalise or retry.
    async fn attempt(&self, record: &WebhookRecord) -> Result<(), WebhookRepositoryError> {
        self.outbox
            .update_state(record.id, WebhookState::Processing, record.retry_cnt)
            .await?;

        match self.sender.deliver(&record.payload).await {
            Ok(()) => {
                self.outbox.mark_delivered(record.id).await?;
                info!(webhook_id = record.id, "webhook delivered");
                Ok(())
            }
            Err(cause) => self.handle_retry(record, cause).await,
        }
    }

    /// Retry transition: finalise at the ceiling, otherwise bump the counter
    /// (re-anchoring `scheduled_at` in the store), pause, and republish. The
    /// pause runs inside this handler's task and never blocks the consumer
    /// loop.
    async fn handle_retry(
        &self,
        record: &WebhookRecord,
        cause: WebhookDeliveryError,
    ) -> Result<(), WebhookRepositoryError> {
        if record.retry_cnt >= self.config.max_retries {
            self.outbox
                .update_state(record.id, WebhookState::Failed, record.retry_cnt)
                .await?;
            error!(
                error = %cause,
                webhook_id = record.id,
                retry_cnt = record.retry_cnt,
                "webhook failed after max retries"
            );
            return Ok(());
        }

        let next_retry = record.retry_cnt + 1;
        self.outbox
            .update_state(record.id, WebhookState::InProgress, next_retry)
            .await?;

        self.sleeper.sleep(self.config.retry_delay).await;

        let task = WebhookTask::for_record(record);
        if let Err(err) = self.queue.publish(&task).await {
            // The scanner picks the row up once scheduled_at passes.
            error!(error = %err, webhook_id = record.id, "failed to republish retry task");
        }

        info!(
            error = %cause,
            webhook_id = record.id,
            retry_cnt = next_retry,
            "webhook scheduled for retry"
        );
        Ok(())
    }
}
