//! Revocation ledger keyed by token fingerprint.

use crate::error::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use passport_common::CacheStore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

const KEY_PREFIX: &str = "revoked";
const SENTINEL: &[u8] = b"revoked";

/// SHA-256 of the raw token, base64url without padding.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Records revoked tokens until they would have expired anyway.
///
/// Entries are only ever written; the store's own TTL removes them.
#[derive(Clone)]
pub struct RevocationLedger {
    store: Arc<dyn CacheStore>,
}

impl RevocationLedger {
    /// Ledger writing into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    fn key(token: &str) -> String {
        format!("{KEY_PREFIX}:{}", fingerprint(token))
    }

    /// Whether `token` has been revoked and the entry is still live.
    #[instrument(skip_all)]
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let revoked = self.store.exists(&Self::key(token)).await?;
        debug!(revoked, "Revocation lookup");
        Ok(revoked)
    }

    /// Revoke `token` for `ttl`, normally its full lifetime `exp - iat`.
    ///
    /// A zero `ttl` records nothing.
    #[instrument(skip(self, token), fields(fingerprint = %fingerprint(token)))]
    pub async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        if ttl.is_zero() {
            debug!("Zero TTL, nothing to revoke");
            return Ok(());
        }

        self.store.put(&Self::key(token), SENTINEL, ttl).await?;
        info!(ttl_secs = ttl.as_secs(), "Token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use passport_common::{MemoryCache, PlatformError};

    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn exists(&self, _key: &str) -> Result<bool, PlatformError> {
            Err(PlatformError::unavailable("connection refused"))
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
            Err(PlatformError::unavailable("connection refused"))
        }

        async fn put(&self, key: &str, _value: &[u8], ttl: Duration) -> Result<(), PlatformError> {
            Err(PlatformError::timeout(format!("put {key}"), ttl))
        }

        async fn delete(&self, _key: &str) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("a.b.c"), fingerprint("a.b.c"));
        assert_ne!(fingerprint("a.b.c"), fingerprint("a.b.d"));
        // 32 bytes, unpadded base64url
        assert_eq!(fingerprint("a.b.c").len(), 43);
    }

    #[tokio::test]
    async fn test_revoke_then_check() {
        let ledger = RevocationLedger::new(Arc::new(MemoryCache::default()));

        assert!(!ledger.is_revoked("a.b.c").await.unwrap());
        ledger.revoke("a.b.c", Duration::from_secs(60)).await.unwrap();
        assert!(ledger.is_revoked("a.b.c").await.unwrap());
        assert!(!ledger.is_revoked("a.b.d").await.unwrap());
    }

    #[tokio::test]
    async fn test_stored_under_fingerprint() {
        let store = MemoryCache::default();
        let ledger = RevocationLedger::new(Arc::new(store.clone()));

        ledger.revoke("a.b.c", Duration::from_secs(60)).await.unwrap();

        let key = format!("revoked:{}", fingerprint("a.b.c"));
        assert_eq!(store.get(&key).await.unwrap(), Some(b"revoked".to_vec()));
        assert!(store.get("revoked:a.b.c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_noop() {
        let store = MemoryCache::default();
        let ledger = RevocationLedger::new(Arc::new(store.clone()));

        ledger.revoke("a.b.c", Duration::ZERO).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let ledger = RevocationLedger::new(Arc::new(FailingStore));

        let err = ledger.is_revoked("a.b.c").await.unwrap_err();
        assert!(matches!(err, AuthError::RevocationStoreFailed(_)));
        assert!(err.is_retryable());

        let err = ledger.revoke("a.b.c", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, AuthError::RevocationStoreFailed(PlatformError::Timeout { .. })));
    }
}
