//! Zone catalog use-case: operator CRUD with cache invalidation.
//!
//! Every mutation invalidates the active-zone snapshot so the hot path sees
//! the change on its next cache miss. Invalidation failures are logged, not
//! fatal: the snapshot TTL bounds the stale window.

use std::sync::Arc;

use tracing::warn;

use super::error::Error;
use super::ports::{ZoneCache, ZoneRepository, ZoneRepositoryError};
use super::zone::{Zone, ZoneDraft};

/// One catalog page plus derived pagination data.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePage {
    pub zones: Vec<Zone>,
    pub total_pages: u32,
}

/// Catalog CRUD over the repository and cache ports.
pub struct ZoneService {
    zones: Arc<dyn ZoneRepository>,
    cache: Arc<dyn ZoneCache>,
}

impl ZoneService {
    pub fn new(zones: Arc<dyn ZoneRepository>, cache: Arc<dyn ZoneCache>) -> Self {
        Self { zones, cache }
    }

    pub async fn create_zone(&self, draft: &ZoneDraft) -> Result<i32, Error> {
        let id = self.zones.create(draft).await.map_err(map_repo_error)?;
        self.invalidate_cache("create").await;
        Ok(id)
    }

    pub async fn zone(&self, id: i32) -> Result<Zone, Error> {
        self.zones.read(id).await.map_err(map_repo_error)
    }

    /// One page of the catalog. Pages below one are clamped to the first.
    pub async fn zones_page(&self, page: u32, limit: u32) -> Result<ZonePage, Error> {
        let page = page.max(1);
        let limit = limit.max(1);
        let (zones, total) = self
            .zones
            .list_page(page, limit)
            .await
            .map_err(map_repo_error)?;

        let total = u32::try_from(total).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(limit);

        Ok(ZonePage { zones, total_pages })
    }

    pub async fn update_zone(&self, id: i32, draft: &ZoneDraft) -> Result<(), Error> {
        self.zones.update(id, draft).await.map_err(map_repo_error)?;
        self.invalidate_cache("update").await;
        Ok(())
    }

    pub async fn delete_zone(&self, id: i32) -> Result<(), Error> {
        self.zones.soft_delete(id).await.map_err(map_repo_error)?;
        self.invalidate_cache("delete").await;
        Ok(())
    }

    async fn invalidate_cache(&self, operation: &str) {
        if let Err(err) = self.cache.invalidate().await {
            warn!(error = %err, operation, "failed to invalidate zone cache");
        }
    }
}

fn map_repo_error(error: ZoneRepositoryError) -> Error {
    match error {
        ZoneRepositoryError::NotFound => Error::not_found("incident not found"),
        other => Error::internal(other.to_string()),
    }
}
