//! Component health endpoint.
//!
//! ```text
//! GET /api/v1/system/health
//! ```
//!
//! The database is load-bearing: when its ping fails the service is
//! `unhealthy` (503). Redis only degrades the service (206) because the
//! outbox keeps the pipeline correct without cache or queue.

use std::sync::Arc;

use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::StatsService;
use crate::outbound::persistence::DbPool;
use crate::outbound::redis::RedisHandle;

/// Dependencies for the health probes, registered as app data.
#[derive(Clone)]
pub struct HealthDependencies {
    pub db: DbPool,
    pub redis: RedisHandle,
    pub stats: Arc<StatsService>,
}

/// Per-component health labels.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentsBody {
    pub database: &'static str,
    pub redis: &'static str,
}

/// Health report body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponseBody {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub active_incidents: usize,
    pub pending_webhooks: usize,
    pub components: ComponentsBody,
}

/// Overall status and HTTP code derived from component checks.
fn derive_status(db_healthy: bool, redis_healthy: bool) -> (&'static str, actix_web::http::StatusCode) {
    use actix_web::http::StatusCode;
    match (db_healthy, redis_healthy) {
        (false, _) => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
        (true, false) => ("degraded", StatusCode::PARTIAL_CONTENT),
        (true, true) => ("healthy", StatusCode::OK),
    }
}

fn component_label(healthy: bool) -> &'static str {
    if healthy {
        "healthy"
    } else {
        "unhealthy"
    }
}

/// Report component health plus pipeline gauges.
#[utoipa::path(
    get,
    path = "/api/v1/system/health",
    responses(
        (status = 200, description = "Healthy", body = HealthResponseBody),
        (status = 206, description = "Degraded: cache/queue unavailable", body = HealthResponseBody),
        (status = 503, description = "Unhealthy: database unavailable", body = HealthResponseBody)
    ),
    tag = "system"
)]
#[get("/system/health")]
pub async fn health_check(deps: web::Data<HealthDependencies>) -> HttpResponse {
    let db_healthy = match deps.db.ping().await {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "database health check failed");
            false
        }
    };

    let redis_healthy = match deps.redis.ping().await {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "redis health check failed");
            false
        }
    };

    let mut active_incidents = 0;
    let mut pending_webhooks = 0;
    if db_healthy {
        match deps.stats.active_zone_count().await {
            Ok(count) => active_incidents = count,
            Err(err) => warn!(error = %err, "failed to get active incidents count"),
        }
        match deps.stats.pending_webhook_count().await {
            Ok(count) => pending_webhooks = count,
            Err(err) => warn!(error = %err, "failed to get pending webhooks count"),
        }
    }

    let (status, http_status) = derive_status(db_healthy, redis_healthy);
    HttpResponse::build(http_status).json(HealthResponseBody {
        status,
        timestamp: Utc::now(),
        active_incidents,
        pending_webhooks,
        components: ComponentsBody {
            database: component_label(db_healthy),
            redis: component_label(redis_healthy),
        },
    })
}
