//! Recorded user check-ins.
//!
//! Checks are append-only: a row is written for every location check and
//! never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Upper bound on stored user identifiers.
pub const MAX_USER_ID_LEN: usize = 128;

/// Validation failures for user identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserIdValidationError {
    #[error("user_id is required")]
    Empty,
    #[error("user_id must be at most {MAX_USER_ID_LEN} characters")]
    TooLong,
}

/// Opaque, non-empty, bounded user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw identifier. Surrounding whitespace is not
    /// trimmed away from the stored value; a whitespace-only value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if raw.chars().count() > MAX_USER_ID_LEN {
            return Err(UserIdValidationError::TooLong);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A single recorded location check.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub id: i32,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub has_alert: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a check row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheck {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub has_alert: bool,
}

/// Rolling check statistics over a trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckStats {
    pub user_count: i64,
    pub total_checks: i64,
    pub period_start: DateTime<Utc>,
}
