//! Check-location coordinator: the synchronous hot path.
//!
//! Orchestrates the zone cache, zone catalog, matcher, check log, webhook
//! outbox, and task queue. Cache and queue failures degrade gracefully; only
//! validation and store failures surface to the caller.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::check::{NewCheck, UserId};
use super::error::Error;
use super::geo::matching_zones;
use super::ports::{CheckRepository, TaskQueue, WebhookRepository, ZoneCache, ZoneRepository};
use super::webhook::{NewWebhook, WebhookTask};
use super::zone::{coordinates_in_range, Zone};

/// Result of one location check.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCheckOutcome {
    pub has_alert: bool,
    pub zones: Vec<Zone>,
}

/// Hot-path coordinator over the pipeline's ports.
pub struct LocationService {
    zones: Arc<dyn ZoneRepository>,
    checks: Arc<dyn CheckRepository>,
    webhooks: Arc<dyn WebhookRepository>,
    cache: Arc<dyn ZoneCache>,
    queue: Arc<dyn TaskQueue>,
}

impl LocationService {
    pub fn new(
        zones: Arc<dyn ZoneRepository>,
        checks: Arc<dyn CheckRepository>,
        webhooks: Arc<dyn WebhookRepository>,
        cache: Arc<dyn ZoneCache>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            zones,
            checks,
            webhooks,
            cache,
            queue,
        }
    }

    /// Check a point against the active-zone set, record the check, and when
    /// it intersects any zone, stage a webhook notification.
    pub async fn check_location(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationCheckOutcome, Error> {
        let user_id = UserId::new(user_id)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !coordinates_in_range(latitude, longitude) {
            return Err(Error::invalid_request("invalid coordinates"));
        }

        let active_zones = self.active_zones().await?;
        let matches = matching_zones(latitude, longitude, &active_zones);
        let has_alert = !matches.is_empty();

        debug!(
            user_id = user_id.as_str(),
            matches = matches.len(),
            "location checked"
        );

        let check_id = self
            .checks
            .create(&NewCheck {
                user_id,
                latitude,
                longitude,
                has_alert,
            })
            .await
            .map_err(|err| Error::internal(format!("failed to save check: {err}")))?;

        if has_alert {
            self.stage_notification(check_id, &matches).await;
        }

        Ok(LocationCheckOutcome {
            has_alert,
            zones: matches,
        })
    }

    /// Load the active zones, preferring the cache. Cache failures are
    /// logged and treated as misses; the catalog is the source of truth.
    async fn active_zones(&self) -> Result<Vec<Zone>, Error> {
        match self.cache.get().await {
            Ok(Some(zones)) => {
                debug!(count = zones.len(), "active zones served from cache");
                return Ok(zones);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "zone cache read failed"),
        }

        let zones = self
            .zones
            .list_active()
            .await
            .map_err(|err| Error::internal(format!("failed to load active zones: {err}")))?;

        if let Err(err) = self.cache.put(&zones).await {
            warn!(error = %err, "zone cache write failed");
        }

        Ok(zones)
    }

    /// Insert the outbox row and publish the dispatch task. Neither failure
    /// reaches the caller: the outbox row alone guarantees delivery via the
    /// scanner, and an outbox insert failure is an operational gap reported
    /// through logs.
    async fn stage_notification(&self, check_id: i32, zones: &[Zone]) {
        let payload = json!({
            "check_id": check_id,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "incidents": zones,
        });
        let payload = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, check_id, "failed to encode webhook payload");
                return;
            }
        };

        let webhook_id = match self
            .webhooks
            .create(&NewWebhook {
                check_id,
                payload: payload.clone(),
            })
            .await
        {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, check_id, "failed to create webhook record");
                return;
            }
        };

        let task = WebhookTask {
            webhook_id,
            check_id,
            payload: String::from_utf8_lossy(&payload).into_owned(),
        };
        if let Err(err) = self.queue.publish(&task).await {
            warn!(error = %err, webhook_id, "failed to publish webhook task");
        }

        info!(webhook_id, check_id, incidents = zones.len(), "webhook staged");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        CheckRepositoryError, MockCheckRepository, MockTaskQueue, MockWebhookRepository,
        MockZoneCache, MockZoneRepository, TaskQueueError, WebhookRepositoryError,
        ZoneCacheError, ZoneRepositoryError,
    };

    fn zone(id: i32, latitude: f64, longitude: f64, radius_m: f64) -> Zone {
        Zone {
            id,
            name: format!("zone-{id}"),
            descr: String::new(),
            latitude,
            longitude,
            radius_m,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Mocks {
        zones: MockZoneRepository,
        checks: MockCheckRepository,
        webhooks: MockWebhookRepository,
        cache: MockZoneCache,
        queue: MockTaskQueue,
    }

    impl Mocks {
        fn into_service(self) -> LocationService {
            LocationService::new(
                Arc::new(self.zones),
                Arc::new(self.checks),
                Arc::new(self.webhooks),
                Arc::new(self.cache),
                Arc::new(self.queue),
            )
        }
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            zones: MockZoneRepository::new(),
            checks: MockCheckRepository::new(),
            webhooks: MockWebhookRepository::new(),
            cache: MockZoneCache::new(),
            queue: MockTaskQueue::new(),
        }
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    #[tokio::test]
    async fn blank_user_id_is_rejected(mocks: Mocks, #[case] user_id: &str) {
        let service = mocks.into_service();
        let error = service
            .check_location(user_id, 55.75, 37.62)
            .await
            .expect_err("blank user id must fail");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "user_id is required");
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 181.0)]
    #[case(0.0, -181.0)]
    #[tokio::test]
    async fn out_of_range_coordinates_are_rejected(
        mocks: Mocks,
        #[case] lat: f64,
        #[case] lng: f64,
    ) {
        let service = mocks.into_service();
        let error = service
            .check_location("u1", lat, lng)
            .await
            .expect_err("coordinates must fail");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "invalid coordinates");
    }

    #[rstest]
    #[tokio::test]
    async fn no_zones_yields_no_alert_and_no_webhook(mut mocks: Mocks) {
        mocks.cache.expect_get().returning(|| Ok(None));
        mocks.cache.expect_put().returning(|_| Ok(()));
        mocks.zones.expect_list_active().returning(|| Ok(Vec::new()));
        mocks
            .checks
            .expect_create()
            .withf(|check| !check.has_alert)
            .returning(|_| Ok(1));

        let outcome = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect("check succeeds");

        assert!(!outcome.has_alert);
        assert!(outcome.zones.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn match_stages_outbox_row_and_queue_task(mut mocks: Mocks) {
        let hit = zone(1, 55.75, 37.62, 1000.0);
        let cached = vec![hit.clone()];
        mocks
            .cache
            .expect_get()
            .returning(move || Ok(Some(cached.clone())));
        mocks
            .checks
            .expect_create()
            .withf(|check| check.has_alert)
            .returning(|_| Ok(7));
        mocks
            .webhooks
            .expect_create()
            .withf(|webhook| {
                let payload: serde_json::Value =
                    serde_json::from_slice(&webhook.payload).expect("payload is JSON");
                let timestamp = payload["timestamp"].as_str().expect("timestamp present");
                webhook.check_id == 7
                    && payload["check_id"] == 7
                    && payload["incidents"].as_array().map(Vec::len) == Some(1)
                    && DateTime::parse_from_rfc3339(timestamp).is_ok()
            })
            .returning(|_| Ok(3));
        mocks
            .queue
            .expect_publish()
            .withf(|task| task.webhook_id == 3 && task.check_id == 7)
            .returning(|_| Ok(()));

        let outcome = mocks
            .into_service()
            .check_location("u1", 55.7505, 37.6205)
            .await
            .expect("check succeeds");

        assert!(outcome.has_alert);
        assert_eq!(outcome.zones, vec![hit]);
    }

    #[rstest]
    #[tokio::test]
    async fn cache_read_failure_falls_back_to_catalog(mut mocks: Mocks) {
        mocks
            .cache
            .expect_get()
            .returning(|| Err(ZoneCacheError::backend("redis down")));
        mocks.cache.expect_put().returning(|_| Ok(()));
        mocks.zones.expect_list_active().returning(|| Ok(Vec::new()));
        mocks.checks.expect_create().returning(|_| Ok(1));

        let outcome = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect("cache failure must not fail the request");
        assert!(!outcome.has_alert);
    }

    #[rstest]
    #[tokio::test]
    async fn catalog_failure_propagates(mut mocks: Mocks) {
        mocks.cache.expect_get().returning(|| Ok(None));
        mocks
            .zones
            .expect_list_active()
            .returning(|| Err(ZoneRepositoryError::connection("pool exhausted")));

        let error = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect_err("catalog failure must propagate");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn check_insert_failure_propagates(mut mocks: Mocks) {
        mocks.cache.expect_get().returning(|| Ok(Some(Vec::new())));
        mocks
            .checks
            .expect_create()
            .returning(|_| Err(CheckRepositoryError::query("insert failed")));

        let error = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect_err("check insert failure must propagate");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn outbox_insert_failure_still_returns_the_match(mut mocks: Mocks) {
        let cached = vec![zone(1, 55.75, 37.62, 1000.0)];
        mocks
            .cache
            .expect_get()
            .returning(move || Ok(Some(cached.clone())));
        mocks.checks.expect_create().returning(|_| Ok(7));
        mocks
            .webhooks
            .expect_create()
            .returning(|_| Err(WebhookRepositoryError::query("insert failed")));

        let outcome = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect("outbox failure must not fail the request");
        assert!(outcome.has_alert);
    }

    #[rstest]
    #[tokio::test]
    async fn queue_publish_failure_still_returns_the_match(mut mocks: Mocks) {
        let cached = vec![zone(1, 55.75, 37.62, 1000.0)];
        mocks
            .cache
            .expect_get()
            .returning(move || Ok(Some(cached.clone())));
        mocks.checks.expect_create().returning(|_| Ok(7));
        mocks.webhooks.expect_create().returning(|_| Ok(3));
        mocks
            .queue
            .expect_publish()
            .returning(|_| Err(TaskQueueError::unavailable("redis down")));

        let outcome = mocks
            .into_service()
            .check_location("u1", 55.75, 37.62)
            .await
            .expect("queue failure must not fail the request");
        assert!(outcome.has_alert);
    }

    #[rstest]
    #[tokio::test]
    async fn boundary_coordinates_are_accepted(mut mocks: Mocks) {
        mocks.cache.expect_get().returning(|| Ok(Some(Vec::new())));
        mocks
            .checks
            .expect_create()
            .with(eq(NewCheck {
                user_id: UserId::new("u1").expect("valid id"),
                latitude: 90.0,
                longitude: -180.0,
                has_alert: false,
            }))
            .returning(|_| Ok(1));

        mocks
            .into_service()
            .check_location("u1", 90.0, -180.0)
            .await
            .expect("boundary coordinates are valid");
    }
}
