//! OpenAPI surface served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::error::{Error, ErrorCode};
use crate::inbound::http::health::{ComponentsBody, HealthResponseBody};
use crate::inbound::http::incidents::{
    IncidentCreateRequestBody, IncidentCreateResponseBody, IncidentListResponseBody,
    IncidentResponseBody, IncidentUpdateRequestBody, MessageResponseBody,
};
use crate::inbound::http::location::{LocationCheckRequestBody, LocationCheckResponseBody};
use crate::inbound::http::stats::StatsResponseBody;

/// Registers the operator bearer-key scheme.
struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "ApiKeyAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}

/// Aggregated OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::location::check_location,
        crate::inbound::http::stats::get_stats,
        crate::inbound::http::health::health_check,
        crate::inbound::http::incidents::create_incident,
        crate::inbound::http::incidents::get_incident,
        crate::inbound::http::incidents::list_incidents,
        crate::inbound::http::incidents::update_incident,
        crate::inbound::http::incidents::delete_incident,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LocationCheckRequestBody,
        LocationCheckResponseBody,
        StatsResponseBody,
        HealthResponseBody,
        ComponentsBody,
        IncidentCreateRequestBody,
        IncidentCreateResponseBody,
        IncidentResponseBody,
        IncidentListResponseBody,
        IncidentUpdateRequestBody,
        MessageResponseBody,
    )),
    modifiers(&ApiKeySecurity)
)]
pub struct ApiDoc;
