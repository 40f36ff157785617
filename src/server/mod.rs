//! Server construction and route wiring.

use std::net::SocketAddr;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::ApiKeyConfig;
use crate::inbound::http::health::{health_check, HealthDependencies};
use crate::inbound::http::incidents::{
    create_incident, delete_incident, get_incident, list_incidents, update_incident,
};
use crate::inbound::http::location::check_location;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::stats::get_stats;
use crate::middleware::Trace;

/// Everything the HTTP layer needs, wired by the composition root.
pub struct ServerDependencies {
    pub http_state: HttpState,
    pub health: HealthDependencies,
    pub api_key: ApiKeyConfig,
}

/// Construct the actix server. The returned [`Server`] must be awaited to
/// drive the listener; actix installs its own signal handling and drains
/// connections with a grace period on shutdown.
pub fn create_server(bind_addr: SocketAddr, deps: ServerDependencies) -> std::io::Result<Server> {
    let http_state = web::Data::new(deps.http_state);
    let health = web::Data::new(deps.health);
    let api_key = web::Data::new(deps.api_key);

    let server = HttpServer::new(move || {
        // `/incidents/stats` is registered before the `{incident_id}` routes
        // so the literal segment wins the match.
        let api = web::scope("/api/v1")
            .service(check_location)
            .service(get_stats)
            .service(health_check)
            .service(list_incidents)
            .service(create_incident)
            .service(get_incident)
            .service(update_incident)
            .service(delete_incident);

        let app = App::new()
            .app_data(http_state.clone())
            .app_data(health.clone())
            .app_data(api_key.clone())
            .wrap(Trace)
            .service(api);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
