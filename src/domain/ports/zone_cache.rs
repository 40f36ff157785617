//! Port for the short-TTL active-zone snapshot cache.

use async_trait::async_trait;

use crate::domain::zone::Zone;

/// Errors surfaced by the caching adapter.
///
/// The cache is a soft optimisation: callers log these and carry on, they
/// never fail a request over them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneCacheError {
    /// Cache backend is unavailable or timing out.
    #[error("zone cache backend failure: {message}")]
    Backend { message: String },
    /// Serialisation or deserialisation of cached content failed.
    #[error("zone cache serialisation failed: {message}")]
    Serialization { message: String },
}

impl ZoneCacheError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Snapshot cache of the active-zone set under a single well-known key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneCache: Send + Sync {
    /// Read the cached snapshot, `None` on a miss.
    async fn get(&self) -> Result<Option<Vec<Zone>>, ZoneCacheError>;

    /// Store a snapshot under the configured TTL.
    async fn put(&self, zones: &[Zone]) -> Result<(), ZoneCacheError>;

    /// Drop the snapshot. Removing an absent key is not an error.
    async fn invalidate(&self) -> Result<(), ZoneCacheError>;
}
