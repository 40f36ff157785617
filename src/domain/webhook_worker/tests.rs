//! Behaviour tests for the webhook worker over scripted stub ports.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::timeout;

use super::*;
use crate::domain::ports::{
    TaskQueue, TaskQueueError, WebhookRepository, WebhookSender,
};
use crate::domain::webhook::NewWebhook;

/// In-memory outbox recording every state transition.
#[derive(Default)]
struct StubOutbox {
    records: Mutex<HashMap<i32, WebhookRecord>>,
    transitions: Mutex<Vec<(WebhookState, i32)>>,
}

impl StubOutbox {
    fn with_record(record: WebhookRecord) -> Self {
        let outbox = Self::default();
        outbox
            .records
            .lock()
            .expect("records lock")
            .insert(record.id, record);
        outbox
    }

    fn insert(&self, record: WebhookRecord) {
        self.records
            .lock()
            .expect("records lock")
            .insert(record.id, record);
    }

    fn record(&self, id: i32) -> WebhookRecord {
        self.records
            .lock()
            .expect("records lock")
            .get(&id)
            .cloned()
            .expect("record exists")
    }

    fn transitions(&self) -> Vec<(WebhookState, i32)> {
        self.transitions.lock().expect("transitions lock").clone()
    }
}

#[async_trait]
impl WebhookRepository for StubOutbox {
    async fn create(&self, _webhook: &NewWebhook) -> Result<i32, WebhookRepositoryError> {
        unreachable!("the worker never inserts outbox rows")
    }

    async fn read(&self, id: i32) -> Result<WebhookRecord, WebhookRepositoryError> {
        self.records
            .lock()
            .expect("records lock")
            .get(&id)
            .cloned()
            .ok_or(WebhookRepositoryError::NotFound)
    }

    async fn update_state(
        &self,
        id: i32,
        state: WebhookState,
        retry_cnt: i32,
    ) -> Result<(), WebhookRepositoryError> {
        let mut records = self.records.lock().expect("records lock");
        let record = records.get_mut(&id).ok_or(WebhookRepositoryError::NotFound)?;
        let now = Utc::now();
        record.state = state;
        record.retry_cnt = retry_cnt;
        record.updated_at = now;
        if state == WebhookState::InProgress {
            record.scheduled_at = now + ChronoDuration::minutes(i64::from(retry_cnt));
        }
        self.transitions
            .lock()
            .expect("transitions lock")
            .push((state, retry_cnt));
        Ok(())
    }

    async fn mark_delivered(&self, id: i32) -> Result<(), WebhookRepositoryError> {
        let mut records = self.records.lock().expect("records lock");
        let record = records.get_mut(&id).ok_or(WebhookRepositoryError::NotFound)?;
        record.state = WebhookState::Delivered;
        record.updated_at = Utc::now();
        self.transitions
            .lock()
            .expect("transitions lock")
            .push((WebhookState::Delivered, record.retry_cnt));
        Ok(())
    }

    async fn list_in_progress(
        &self,
        limit: i64,
    ) -> Result<Vec<WebhookRecord>, WebhookRepositoryError> {
        let now = Utc::now();
        let mut due: Vec<WebhookRecord> = self
            .records
            .lock()
            .expect("records lock")
            .values()
            .filter(|r| r.state == WebhookState::InProgress && r.scheduled_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.scheduled_at);
        due.truncate(usize::try_from(limit).expect("limit fits"));
        Ok(due)
    }
}

/// FIFO queue over a plain deque; pops never block.
#[derive(Default)]
struct StubQueue {
    tasks: Mutex<VecDeque<WebhookTask>>,
}

impl StubQueue {
    fn pop(&self) -> Option<WebhookTask> {
        self.tasks.lock().expect("tasks lock").pop_front()
    }

    fn len(&self) -> usize {
        self.tasks.lock().expect("tasks lock").len()
    }
}

#[async_trait]
impl TaskQueue for StubQueue {
    async fn publish(&self, task: &WebhookTask) -> Result<(), TaskQueueError> {
        self.tasks
            .lock()
            .expect("tasks lock")
            .push_back(task.clone());
        Ok(())
    }

    async fn blocking_pop(
        &self,
        _timeout: Duration,
    ) -> Result<Option<WebhookTask>, TaskQueueError> {
        Ok(self.pop())
    }
}

/// Sender answering from a script; unscripted calls succeed.
#[derive(Default)]
struct ScriptedSender {
    outcomes: Mutex<VecDeque<Result<(), WebhookDeliveryError>>>,
    calls: Mutex<u32>,
}

impl ScriptedSender {
    fn with_outcomes(outcomes: Vec<Result<(), WebhookDeliveryError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().expect("calls lock")
    }
}

#[async_trait]
impl WebhookSender for ScriptedSender {
    async fn deliver(&self, _payload: &[u8]) -> Result<(), WebhookDeliveryError> {
        *self.calls.lock().expect("calls lock") += 1;
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Sleeper that records requested pauses without waiting.
#[derive(Default)]
struct RecordingSleeper {
    naps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn naps(&self) -> Vec<Duration> {
        self.naps.lock().expect("naps lock").clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.naps.lock().expect("naps lock").push(duration);
    }
}

fn pending_record(id: i32, retry_cnt: i32) -> WebhookRecord {
    let now = Utc::now();
    WebhookRecord {
        id,
        check_id: 40 + id,
        state: WebhookState::InProgress,
        retry_cnt,
        payload: br#"{"check_id":41}"#.to_vec(),
        created_at: now,
        updated_at: now,
        scheduled_at: now - ChronoDuration::seconds(1),
    }
}

fn task_for(record: &WebhookRecord) -> WebhookTask {
    WebhookTask::for_record(record)
}

struct Fixture {
    outbox: Arc<StubOutbox>,
    queue: Arc<StubQueue>,
    sender: Arc<ScriptedSender>,
    sleeper: Arc<RecordingSleeper>,
    worker: Arc<WebhookWorker>,
}

fn fixture(
    outbox: StubOutbox,
    outcomes: Vec<Result<(), WebhookDeliveryError>>,
    max_retries: i32,
) -> Fixture {
    let outbox = Arc::new(outbox);
    let queue = Arc::new(StubQueue::default());
    let sender = Arc::new(ScriptedSender::with_outcomes(outcomes));
    let sleeper = Arc::new(RecordingSleeper::default());
    let worker = Arc::new(WebhookWorker::with_runtime(
        WebhookWorkerPorts::new(outbox.clone(), queue.clone(), sender.clone()),
        sleeper.clone(),
        WebhookWorkerConfig {
            max_retries,
            retry_delay: Duration::from_secs(1),
        },
    ));
    Fixture {
        outbox,
        queue,
        sender,
        sleeper,
        worker,
    }
}

#[tokio::test]
async fn successful_delivery_transitions_processing_then_delivered() {
    let record = pending_record(3, 0);
    let task = task_for(&record);
    let fx = fixture(StubOutbox::with_record(record), vec![Ok(())], 3);

    fx.worker.dispatch(task).await;

    assert_eq!(
        fx.outbox.transitions(),
        vec![
            (WebhookState::Processing, 0),
            (WebhookState::Delivered, 0),
        ]
    );
    assert_eq!(fx.outbox.record(3).state, WebhookState::Delivered);
    assert_eq!(fx.queue.len(), 0, "no retry task expected");
    assert!(fx.sleeper.naps().is_empty());
}

#[tokio::test]
async fn two_failures_then_success_delivers_with_retry_count_two() {
    let record = pending_record(5, 0);
    let task = task_for(&record);
    let fx = fixture(
        StubOutbox::with_record(record),
        vec![
            Err(WebhookDeliveryError::status(500)),
            Err(WebhookDeliveryError::status(500)),
            Ok(()),
        ],
        3,
    );

    fx.worker.dispatch(task).await;
    let retry = fx.queue.pop().expect("first retry republished");
    fx.worker.dispatch(retry).await;
    let retry = fx.queue.pop().expect("second retry republished");
    fx.worker.dispatch(retry).await;

    assert_eq!(
        fx.outbox.transitions(),
        vec![
            (WebhookState::Processing, 0),
            (WebhookState::InProgress, 1),
            (WebhookState::Processing, 1),
            (WebhookState::InProgress, 2),
            (WebhookState::Processing, 2),
            (WebhookState::Delivered, 2),
        ]
    );
    let record = fx.outbox.record(5);
    assert_eq!(record.state, WebhookState::Delivered);
    assert_eq!(record.retry_cnt, 2);
    assert_eq!(fx.sleeper.naps().len(), 2, "one pause per retry");
}

#[tokio::test]
async fn retry_ceiling_finalises_the_row_as_failed() {
    let record = pending_record(8, 0);
    let task = task_for(&record);
    let fx = fixture(
        StubOutbox::with_record(record),
        vec![
            Err(WebhookDeliveryError::transport("connection refused")),
            Err(WebhookDeliveryError::transport("connection refused")),
            Err(WebhookDeliveryError::transport("connection refused")),
        ],
        2,
    );

    fx.worker.dispatch(task).await;
    let retry = fx.queue.pop().expect("first retry republished");
    fx.worker.dispatch(retry).await;
    let retry = fx.queue.pop().expect("second retry republished");
    fx.worker.dispatch(retry).await;

    let record = fx.outbox.record(8);
    assert_eq!(record.state, WebhookState::Failed);
    assert_eq!(record.retry_cnt, 2);
    assert_eq!(fx.queue.len(), 0, "terminal rows are not republished");
    assert_eq!(fx.sender.calls(), 3);
}

#[tokio::test]
async fn retry_reanchors_the_scheduled_time() {
    let record = pending_record(2, 0);
    let task = task_for(&record);
    let before = Utc::now();
    let fx = fixture(
        StubOutbox::with_record(record),
        vec![Err(WebhookDeliveryError::status(503))],
        3,
    );

    fx.worker.dispatch(task).await;

    let record = fx.outbox.record(2);
    assert_eq!(record.state, WebhookState::InProgress);
    assert!(
        record.scheduled_at >= before + ChronoDuration::seconds(59),
        "scheduled_at advances by retry_cnt minutes"
    );
}

#[tokio::test]
async fn duplicate_dispatch_of_a_delivered_row_is_tolerated() {
    let record = pending_record(6, 0);
    let task = task_for(&record);
    let fx = fixture(StubOutbox::with_record(record), vec![Ok(()), Ok(())], 3);

    fx.worker.dispatch(task.clone()).await;
    fx.worker.dispatch(task).await;

    assert_eq!(fx.outbox.record(6).state, WebhookState::Delivered);
    assert_eq!(fx.sender.calls(), 2, "both paths attempt delivery");
}

#[tokio::test]
async fn unknown_webhook_id_is_logged_and_skipped() {
    let fx = fixture(StubOutbox::default(), Vec::new(), 3);

    fx.worker
        .dispatch(WebhookTask {
            webhook_id: 99,
            check_id: 1,
            payload: String::new(),
        })
        .await;

    assert!(fx.outbox.transitions().is_empty());
    assert_eq!(fx.sender.calls(), 0);
}

#[tokio::test]
async fn scanner_republishes_only_due_rows() {
    let outbox = StubOutbox::default();
    outbox.insert(pending_record(1, 0));

    let mut future = pending_record(2, 1);
    future.scheduled_at = Utc::now() + ChronoDuration::minutes(5);
    outbox.insert(future);

    let mut delivered = pending_record(3, 0);
    delivered.state = WebhookState::Delivered;
    outbox.insert(delivered);

    let fx = fixture(outbox, Vec::new(), 3);
    fx.worker.rescue_overdue().await;

    let task = fx.queue.pop().expect("due row republished");
    assert_eq!(task.webhook_id, 1);
    assert_eq!(fx.queue.len(), 0, "future and terminal rows stay put");
}

#[tokio::test]
async fn both_loops_stop_on_shutdown() {
    let fx = fixture(StubOutbox::default(), Vec::new(), 3);
    let shutdown = tokio_util::sync::CancellationToken::new();
    let (consumer, scanner) = fx.worker.spawn(shutdown.clone());

    shutdown.cancel();

    timeout(Duration::from_secs(1), consumer)
        .await
        .expect("consumer stops promptly")
        .expect("consumer task joins");
    timeout(Duration::from_secs(1), scanner)
        .await
        .expect("scanner stops promptly")
        .expect("scanner task joins");
}
