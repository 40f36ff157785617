//! Check statistics endpoint.
//!
//! ```text
//! GET /api/v1/incidents/stats
//! ```

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Rolling statistics over the configured window.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponseBody {
    pub user_count: i64,
    pub total_checks: i64,
    pub window_minutes: i64,
    pub period_start: DateTime<Utc>,
}

/// Distinct users and total checks over the trailing window.
#[utoipa::path(
    get,
    path = "/api/v1/incidents/stats",
    responses(
        (status = 200, description = "Rolling statistics", body = StatsResponseBody),
        (status = 500, description = "Store failure")
    ),
    tag = "stats"
)]
#[get("/incidents/stats")]
pub async fn get_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponseBody>> {
    let window_minutes = state.stats_window_minutes;
    let stats = state.stats.stats(window_minutes).await?;

    Ok(web::Json(StatsResponseBody {
        user_count: stats.user_count,
        total_checks: stats.total_checks,
        window_minutes,
        period_start: stats.period_start,
    }))
}
