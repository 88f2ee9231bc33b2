use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{CounterStore, StoreError};

/// Counter store speaking the Redis protocol directly.
///
/// `ConnectionManager` reconnects on its own and is cheap to clone, so each
/// command works on its own handle.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection.clone();
        let count: i64 = conn.incr(key, 1).await?;
        Ok(count)
    }

    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let seconds = i64::try_from(seconds)
            .map_err(|_| StoreError::UnexpectedReply(format!("expiry too large: {seconds}")))?;
        let _: () = conn.expire(key, seconds).await?;
        Ok(())
    }
}
