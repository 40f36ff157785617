//! Public location-check endpoint.
//!
//! ```text
//! POST /api/v1/location/check
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::incidents::IncidentResponseBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for a location check.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LocationCheckRequestBody {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response payload: the alert flag and every matching zone.
#[derive(Debug, Serialize, ToSchema)]
pub struct LocationCheckResponseBody {
    pub has_alert: bool,
    pub incidents: Vec<IncidentResponseBody>,
}

/// Check a point against the active danger zones.
#[utoipa::path(
    post,
    path = "/api/v1/location/check",
    request_body = LocationCheckRequestBody,
    responses(
        (status = 200, description = "Check result", body = LocationCheckResponseBody),
        (status = 400, description = "Missing user_id or invalid coordinates"),
        (status = 500, description = "Store failure")
    ),
    tag = "location"
)]
#[post("/location/check")]
pub async fn check_location(
    state: web::Data<HttpState>,
    payload: web::Json<LocationCheckRequestBody>,
) -> ApiResult<web::Json<LocationCheckResponseBody>> {
    let outcome = state
        .location
        .check_location(&payload.user_id, payload.latitude, payload.longitude)
        .await?;

    Ok(web::Json(LocationCheckResponseBody {
        has_alert: outcome.has_alert,
        incidents: outcome
            .zones
            .into_iter()
            .map(IncidentResponseBody::from)
            .collect(),
    }))
}
