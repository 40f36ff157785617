//! Rolling check statistics and health gauges.

use std::sync::Arc;

use tracing::debug;

use super::check::CheckStats;
use super::error::Error;
use super::ports::{CheckRepository, WebhookRepository, ZoneRepository};

/// Ceiling on the pending-webhook gauge; beyond this the exact number stops
/// being operationally interesting.
const PENDING_WEBHOOK_SCAN_LIMIT: i64 = 1000;

/// Read-only statistics over the three stores.
pub struct StatsService {
    zones: Arc<dyn ZoneRepository>,
    checks: Arc<dyn CheckRepository>,
    webhooks: Arc<dyn WebhookRepository>,
}

impl StatsService {
    pub fn new(
        zones: Arc<dyn ZoneRepository>,
        checks: Arc<dyn CheckRepository>,
        webhooks: Arc<dyn WebhookRepository>,
    ) -> Self {
        Self {
            zones,
            checks,
            webhooks,
        }
    }

    /// Distinct users and total checks over the trailing window.
    pub async fn stats(&self, window_minutes: i64) -> Result<CheckStats, Error> {
        if window_minutes <= 0 {
            return Err(Error::invalid_request("window minutes must be positive"));
        }

        let stats = self
            .checks
            .stats(window_minutes)
            .await
            .map_err(|err| Error::internal(format!("failed to get stats: {err}")))?;

        debug!(
            window_minutes,
            user_count = stats.user_count,
            total_checks = stats.total_checks,
            "stats retrieved"
        );

        Ok(stats)
    }

    /// Number of active, non-deleted zones.
    pub async fn active_zone_count(&self) -> Result<usize, Error> {
        let zones = self
            .zones
            .list_active()
            .await
            .map_err(|err| Error::internal(format!("failed to get active zones: {err}")))?;
        Ok(zones.len())
    }

    /// Number of outbox rows still awaiting delivery, capped at the scan
    /// limit.
    pub async fn pending_webhook_count(&self) -> Result<usize, Error> {
        let pending = self
            .webhooks
            .list_in_progress(PENDING_WEBHOOK_SCAN_LIMIT)
            .await
            .map_err(|err| Error::internal(format!("failed to get pending webhooks: {err}")))?;
        Ok(pending.len())
    }
}
