//! Shared Redis connection handling for the cache and queue adapters.

use redis::aio::ConnectionManager;

/// Cloneable handle over one multiplexed Redis connection.
///
/// The [`ConnectionManager`] reconnects on its own, so adapters hold clones
/// of this handle rather than managing connections themselves.
#[derive(Clone)]
pub struct RedisHandle {
    manager: ConnectionManager,
}

impl RedisHandle {
    /// Connect and verify the server responds.
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        let handle = Self { manager };
        handle.ping().await?;
        Ok(handle)
    }

    /// Round-trip a `PING` to verify connectivity.
    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.connection();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
    }

    /// A fresh clone of the managed connection for one operation.
    pub(crate) fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}
