//! Danger zone entity and validated draft.
//!
//! A zone is a circular region on the Earth's surface. Soft deletion is a
//! persistence concern: deleted rows never surface as [`Zone`] values, so the
//! domain type carries no `deleted_at` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistent circular danger region.
///
/// Serialisation of this type is part of two wire contracts: the cached
/// active-zone snapshot and the `incidents` array of webhook payloads. Field
/// names therefore stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i32,
    pub name: String,
    pub descr: String,
    /// Centre latitude in decimal degrees, within [-90, 90].
    pub latitude: f64,
    /// Centre longitude in decimal degrees, within [-180, 180].
    pub longitude: f64,
    /// Radius in metres, strictly positive.
    pub radius_m: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation failures for zone drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZoneValidationError {
    #[error("name required")]
    NameRequired,
    #[error("invalid coordinates")]
    InvalidCoordinates,
    #[error("radius_m must be > 0")]
    InvalidRadius,
}

/// Validated input for creating or updating a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDraft {
    pub name: String,
    pub descr: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub is_active: bool,
}

impl ZoneDraft {
    /// Build a draft, rejecting blank names, out-of-range coordinates, and
    /// non-positive radii. Boundary coordinates (±90, ±180) are accepted.
    pub fn new(
        name: impl Into<String>,
        descr: impl Into<String>,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        is_active: bool,
    ) -> Result<Self, ZoneValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ZoneValidationError::NameRequired);
        }
        if !coordinates_in_range(latitude, longitude) {
            return Err(ZoneValidationError::InvalidCoordinates);
        }
        if radius_m.is_nan() || radius_m <= 0.0 {
            return Err(ZoneValidationError::InvalidRadius);
        }
        Ok(Self {
            name,
            descr: descr.into(),
            latitude,
            longitude,
            radius_m,
            is_active,
        })
    }
}

/// Check WGS84 coordinate ranges, boundaries inclusive.
pub fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}
