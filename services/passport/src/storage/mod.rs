//! Cache stores backing the revocation ledger.

pub mod redis;

pub use self::redis::RedisCache;

use crate::config::{CacheDriver, CacheSettings};
use passport_common::{CacheStore, MemoryCache, PlatformError};
use std::sync::Arc;

/// Build the store selected by `settings`.
pub async fn build_store(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>, PlatformError> {
    let config = settings.client_config();
    match settings.driver {
        CacheDriver::Memory => Ok(Arc::new(MemoryCache::new(config))),
        CacheDriver::Redis => Ok(Arc::new(RedisCache::connect(&settings.redis_url, config).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = build_store(&CacheSettings::default()).await.unwrap();
        store.put("k", b"v", std::time::Duration::from_secs(1)).await.unwrap();
        assert!(store.exists("k").await.unwrap());
    }
}
