//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data` so they depend on
//! the use-case services only and stay testable with mocked ports.

use std::sync::Arc;

use crate::domain::{LocationService, StatsService, ZoneService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub location: Arc<LocationService>,
    pub zones: Arc<ZoneService>,
    pub stats: Arc<StatsService>,
    /// Fixed window used by the stats endpoint.
    pub stats_window_minutes: i64,
}

impl HttpState {
    pub fn new(
        location: Arc<LocationService>,
        zones: Arc<ZoneService>,
        stats: Arc<StatsService>,
        stats_window_minutes: i64,
    ) -> Self {
        Self {
            location,
            zones,
            stats,
            stats_window_minutes,
        }
    }
}
