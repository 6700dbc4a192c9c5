//! Redis-backed cache store.

use async_trait::async_trait;
use passport_common::{with_deadline, CacheClientConfig, CacheStore, PlatformError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{info, instrument};

/// [`CacheStore`] over a shared Redis connection.
///
/// Each call is bounded by the configured operation timeout. Failures are
/// returned to the caller, never retried here.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    config: CacheClientConfig,
}

impl RedisCache {
    /// Connect to `redis_url`.
    pub async fn connect(
        redis_url: &str,
        config: CacheClientConfig,
    ) -> Result<Self, PlatformError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| PlatformError::invalid_input(format!("Invalid Redis URL: {e}")))?;

        let conn = with_deadline("connect", config.operation_timeout, async {
            ConnectionManager::new(client).await.map_err(redis_error)
        })
        .await?;

        info!(namespace = %config.namespace, "Connected to Redis cache");
        Ok(Self { conn, config })
    }

    /// Prefix applied to every key.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool, PlatformError> {
        let key = self.config.namespaced_key(key);
        let mut conn = self.conn.clone();
        with_deadline("exists", self.config.operation_timeout, async move {
            conn.exists(&key).await.map_err(redis_error)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let key = self.config.namespaced_key(key);
        let mut conn = self.conn.clone();
        with_deadline("get", self.config.operation_timeout, async move {
            conn.get(&key).await.map_err(redis_error)
        })
        .await
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError> {
        if key.is_empty() {
            return Err(PlatformError::invalid_input("cache key must not be empty"));
        }

        let key = self.config.namespaced_key(key);
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut conn = self.conn.clone();
        with_deadline("put", self.config.operation_timeout, async move {
            conn.pset_ex::<_, _, ()>(&key, value, millis)
                .await
                .map_err(redis_error)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        let key = self.config.namespaced_key(key);
        let mut conn = self.conn.clone();
        with_deadline("delete", self.config.operation_timeout, async move {
            conn.del::<_, ()>(&key).await.map_err(redis_error)
        })
        .await
    }
}

fn redis_error(err: redis::RedisError) -> PlatformError {
    PlatformError::unavailable(format!("Redis: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = RedisCache::connect("not-a-url", CacheClientConfig::default()).await;
        assert!(matches!(result, Err(PlatformError::InvalidInput(_))));
    }

    #[test]
    fn test_redis_error_is_retryable() {
        let err = redis_error(redis::RedisError::from((redis::ErrorKind::IoError, "refused")));
        assert!(err.is_retryable());
    }
}
