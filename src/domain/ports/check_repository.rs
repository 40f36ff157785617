//! Port for the append-only check-in log.

use async_trait::async_trait;

use crate::domain::check::{CheckStats, NewCheck};

/// Errors raised by check repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckRepositoryError {
    /// Repository connection could not be established.
    #[error("check repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("check repository query failed: {message}")]
    Query { message: String },
}

impl CheckRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckRepository: Send + Sync {
    /// Append a check row and return its identifier.
    async fn create(&self, check: &NewCheck) -> Result<i32, CheckRepositoryError>;

    /// Distinct users and total checks over the trailing window. The caller
    /// guarantees `window_minutes > 0`.
    async fn stats(&self, window_minutes: i64) -> Result<CheckStats, CheckRepositoryError>;
}
