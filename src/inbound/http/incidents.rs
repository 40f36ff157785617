//! Operator CRUD over the danger-zone catalog.
//!
//! ```text
//! POST   /api/v1/incidents
//! GET    /api/v1/incidents?page=&limit=
//! GET    /api/v1/incidents/{incident_id}
//! PUT    /api/v1/incidents/{incident_id}
//! DELETE /api/v1/incidents/{incident_id}
//! ```
//!
//! All routes require a bearer key. Updates are partial: absent fields keep
//! the stored value.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Zone, ZoneDraft};
use crate::inbound::http::auth::OperatorAuth;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for creating an incident.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IncidentCreateRequestBody {
    pub name: String,
    #[serde(default)]
    pub descr: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Response payload carrying a created incident's identifier.
#[derive(Debug, Serialize, ToSchema)]
pub struct IncidentCreateResponseBody {
    pub incident_id: i32,
}

/// One incident as returned by read endpoints and the location check.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IncidentResponseBody {
    pub incident_id: i32,
    pub name: String,
    pub descr: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Zone> for IncidentResponseBody {
    fn from(zone: Zone) -> Self {
        Self {
            incident_id: zone.id,
            name: zone.name,
            descr: zone.descr,
            latitude: zone.latitude,
            longitude: zone.longitude,
            radius_m: zone.radius_m,
            is_active: zone.is_active,
            created_at: zone.created_at,
            updated_at: zone.updated_at,
        }
    }
}

/// Paginated incident listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct IncidentListResponseBody {
    pub incidents: Vec<IncidentResponseBody>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Partial update payload; absent fields keep the stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IncidentUpdateRequestBody {
    pub name: Option<String>,
    pub descr: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: Option<f64>,
    pub is_active: Option<bool>,
}

/// Confirmation message for mutations without a body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponseBody {
    pub message: String,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Page size, at least 1.
    pub limit: Option<u32>,
}

fn draft_error(error: crate::domain::ZoneValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Range-check the fields an update actually carries. Runs before the
/// current row is fetched, so bad input on a missing id is still a 400.
fn validate_update_fields(payload: &IncidentUpdateRequestBody) -> Result<(), Error> {
    if let Some(latitude) = payload.latitude {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::invalid_request("invalid latitude"));
        }
    }
    if let Some(longitude) = payload.longitude {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::invalid_request("invalid longitude"));
        }
    }
    if let Some(radius_m) = payload.radius_m {
        if radius_m.is_nan() || radius_m <= 0.0 {
            return Err(Error::invalid_request("radius_m must be > 0"));
        }
    }
    Ok(())
}

/// Create a danger zone. New zones start active.
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    request_body = IncidentCreateRequestBody,
    responses(
        (status = 201, description = "Incident created", body = IncidentCreateResponseBody),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "incidents",
    security(("ApiKeyAuth" = []))
)]
#[post("/incidents")]
pub async fn create_incident(
    _auth: OperatorAuth,
    state: web::Data<HttpState>,
    payload: web::Json<IncidentCreateRequestBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let draft = ZoneDraft::new(
        payload.name,
        payload.descr,
        payload.latitude,
        payload.longitude,
        payload.radius_m,
        true,
    )
    .map_err(draft_error)?;

    let incident_id = state.zones.create_zone(&draft).await?;

    Ok(HttpResponse::Created().json(IncidentCreateResponseBody { incident_id }))
}

/// Fetch one danger zone by id.
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{incident_id}",
    responses(
        (status = 200, description = "Incident details", body = IncidentResponseBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(("ApiKeyAuth" = []))
)]
#[get("/incidents/{incident_id}")]
pub async fn get_incident(
    _auth: OperatorAuth,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<IncidentResponseBody>> {
    let zone = state.zones.zone(path.into_inner()).await?;
    Ok(web::Json(IncidentResponseBody::from(zone)))
}

/// List danger zones with pagination.
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    params(ListQuery),
    responses(
        (status = 200, description = "One catalog page", body = IncidentListResponseBody),
        (status = 400, description = "Invalid pagination parameters"),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "incidents",
    security(("ApiKeyAuth" = []))
)]
#[get("/incidents")]
pub async fn list_incidents(
    _auth: OperatorAuth,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<IncidentListResponseBody>> {
    if query.page == Some(0) {
        return Err(Error::invalid_request(
            "invalid page parameter (must be >= 1)",
        ));
    }
    if query.limit == Some(0) {
        return Err(Error::invalid_request(
            "invalid limit parameter (must be >= 1)",
        ));
    }
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    let result = state.zones.zones_page(page, limit).await?;

    Ok(web::Json(IncidentListResponseBody {
        incidents: result
            .zones
            .into_iter()
            .map(IncidentResponseBody::from)
            .collect(),
        page,
        limit,
        total_pages: result.total_pages,
    }))
}

/// Partially update a danger zone.
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{incident_id}",
    request_body = IncidentUpdateRequestBody,
    responses(
        (status = 200, description = "Incident updated", body = MessageResponseBody),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(("ApiKeyAuth" = []))
)]
#[put("/incidents/{incident_id}")]
pub async fn update_incident(
    _auth: OperatorAuth,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<IncidentUpdateRequestBody>,
) -> ApiResult<web::Json<MessageResponseBody>> {
    let id = path.into_inner();
    let payload = payload.into_inner();

    validate_update_fields(&payload)?;

    let current = state.zones.zone(id).await?;
    let draft = ZoneDraft::new(
        payload.name.unwrap_or(current.name),
        payload.descr.unwrap_or(current.descr),
        payload.latitude.unwrap_or(current.latitude),
        payload.longitude.unwrap_or(current.longitude),
        payload.radius_m.unwrap_or(current.radius_m),
        payload.is_active.unwrap_or(current.is_active),
    )
    .map_err(draft_error)?;

    state.zones.update_zone(id, &draft).await?;

    Ok(web::Json(MessageResponseBody {
        message: "incident updated".to_owned(),
    }))
}

/// Soft-delete a danger zone.
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{incident_id}",
    responses(
        (status = 200, description = "Incident deleted", body = MessageResponseBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Incident not found")
    ),
    tag = "incidents",
    security(("ApiKeyAuth" = []))
)]
#[delete("/incidents/{incident_id}")]
pub async fn delete_incident(
    _auth: OperatorAuth,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageResponseBody>> {
    state.zones.delete_zone(path.into_inner()).await?;

    Ok(web::Json(MessageResponseBody {
        message: "incident deleted".to_owned(),
    }))
}
