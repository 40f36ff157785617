//! Redis-backed active-zone snapshot cache.
//!
//! One namespaced key maps to the JSON-serialised list of active zones with
//! a fixed TTL. The version suffix allows invalidation-by-rename if the
//! snapshot format ever changes.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::ports::{ZoneCache, ZoneCacheError};
use crate::domain::zone::Zone;
use crate::outbound::redis::RedisHandle;

/// Cache key for the active-zone snapshot.
const ACTIVE_ZONES_KEY: &str = "active_incidents:v1";

/// Redis implementation of the zone cache port.
#[derive(Clone)]
pub struct RedisZoneCache {
    redis: RedisHandle,
    ttl: Duration,
}

impl RedisZoneCache {
    pub fn new(redis: RedisHandle, ttl: Duration) -> Self {
        Self { redis, ttl }
    }
}

fn backend_error(error: redis::RedisError) -> ZoneCacheError {
    ZoneCacheError::backend(error.to_string())
}

#[async_trait]
impl ZoneCache for RedisZoneCache {
    async fn get(&self) -> Result<Option<Vec<Zone>>, ZoneCacheError> {
        let mut conn = self.redis.connection();
        let raw: Option<Vec<u8>> = conn
            .get(ACTIVE_ZONES_KEY)
            .await
            .map_err(backend_error)?;

        match raw {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|err| ZoneCacheError::serialization(err.to_string())),
        }
    }

    async fn put(&self, zones: &[Zone]) -> Result<(), ZoneCacheError> {
        let bytes = serde_json::to_vec(zones)
            .map_err(|err| ZoneCacheError::serialization(err.to_string()))?;

        let mut conn = self.redis.connection();
        let () = conn
            .set_ex(ACTIVE_ZONES_KEY, bytes, self.ttl.as_secs())
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), ZoneCacheError> {
        let mut conn = self.redis.connection();
        // DEL of an absent key returns zero, which is still success.
        let _removed: i64 = conn.del(ACTIVE_ZONES_KEY).await.map_err(backend_error)?;
        Ok(())
    }
}
