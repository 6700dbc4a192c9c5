//! Key-value cache contract and the in-process store.
//!
//! [`CacheStore`] is the narrow surface the auth core relies on: an atomic
//! set-with-TTL and an existence check, plus `get`/`delete` for tooling.
//! Stores own expiry; callers never clean up entries themselves.

use crate::PlatformError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Cache client configuration.
#[derive(Debug, Clone)]
pub struct CacheClientConfig {
    /// Namespace prepended to every key
    pub namespace: String,
    /// Number of entries after which expired ones are swept
    pub local_cache_size: usize,
    /// Upper bound for a single store round-trip
    pub operation_timeout: Duration,
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            namespace: "passport".to_string(),
            local_cache_size: 10_000,
            operation_timeout: Duration::from_millis(500),
        }
    }
}

impl CacheClientConfig {
    /// Create config with custom namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Create config with a custom sweep threshold.
    #[must_use]
    pub const fn with_local_cache_size(mut self, size: usize) -> Self {
        self.local_cache_size = size;
        self
    }

    /// Create config with a custom per-operation timeout.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Prefix `key` with the configured namespace.
    #[must_use]
    pub fn namespaced_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

/// Key-value store with per-entry time-to-live.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Check whether a live entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool, PlatformError>;

    /// Fetch the value stored under `key`, if it has not expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> Result<(), PlatformError>;
}

/// Run a store operation under a deadline.
///
/// # Errors
///
/// Returns [`PlatformError::Timeout`] when `timeout` elapses first, otherwise
/// whatever the operation returned.
pub async fn with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    fut: F,
) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::timeout(operation, timeout)),
    }
}

struct LocalCacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl LocalCacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process cache for single-instance deployments and tests.
///
/// Entries are not shared between processes, so revocations recorded here
/// are only visible to the process that wrote them.
#[derive(Clone)]
pub struct MemoryCache {
    config: CacheClientConfig,
    entries: Arc<RwLock<HashMap<String, LocalCacheEntry>>>,
}

impl MemoryCache {
    /// Create a new in-process cache.
    #[must_use]
    pub fn new(config: CacheClientConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Number of entries currently held, live or not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn evict_expired(entries: &mut HashMap<String, LocalCacheEntry>) {
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        debug!(evicted = before - entries.len(), "Swept expired cache entries");
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(CacheClientConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn exists(&self, key: &str) -> Result<bool, PlatformError> {
        let key = self.config.namespaced_key(key);
        let entries = self.entries.read().await;
        Ok(entries
            .get(&key)
            .is_some_and(|entry| entry.is_live(Instant::now())))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let key = self.config.namespaced_key(key);
        let entries = self.entries.read().await;
        Ok(entries
            .get(&key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), PlatformError> {
        if key.is_empty() {
            return Err(PlatformError::invalid_input("cache key must not be empty"));
        }

        let key = self.config.namespaced_key(key);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            LocalCacheEntry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );

        if entries.len() > self.config.local_cache_size {
            Self::evict_expired(&mut entries);
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PlatformError> {
        let key = self.config.namespaced_key(key);
        self.entries.write().await.remove(&key);
        Ok(())
    }
}
