//! Property-based tests for passport-common.

use passport_common::{CacheClientConfig, CacheStore, MemoryCache, PlatformError};
use proptest::prelude::*;
use std::time::Duration;

fn arb_cache_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:-]{1,64}"
}

fn arb_cache_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever is put is returned unchanged while the entry is live.
    #[test]
    fn prop_put_then_get_returns_value(key in arb_cache_key(), data in arb_cache_data()) {
        let cache = MemoryCache::default();
        tokio_test::block_on(async {
            cache.put(&key, &data, Duration::from_secs(60)).await.unwrap();
            prop_assert!(cache.exists(&key).await.unwrap());
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(data.clone()));
            Ok(())
        })?;
    }

    /// The same key in two namespaces never collides.
    #[test]
    fn prop_namespace_isolation(
        key in arb_cache_key(),
        data1 in arb_cache_data(),
        data2 in arb_cache_data(),
    ) {
        let cache1 = MemoryCache::new(CacheClientConfig::default().with_namespace("ns1"));
        let cache2 = MemoryCache::new(CacheClientConfig::default().with_namespace("ns2"));
        tokio_test::block_on(async {
            cache1.put(&key, &data1, Duration::from_secs(60)).await.unwrap();
            cache2.put(&key, &data2, Duration::from_secs(60)).await.unwrap();
            prop_assert_eq!(cache1.get(&key).await.unwrap(), Some(data1.clone()));
            prop_assert_eq!(cache2.get(&key).await.unwrap(), Some(data2.clone()));
            Ok(())
        })?;
    }

    /// Only transient failures are classified as retryable.
    #[test]
    fn prop_retryable_classification(msg in "[a-zA-Z0-9 ]{1,50}", millis in 1u64..10_000) {
        prop_assert!(PlatformError::unavailable(msg.clone()).is_retryable());
        let timeout = PlatformError::timeout(msg.clone(), Duration::from_millis(millis));
        prop_assert!(timeout.is_retryable());
        prop_assert!(!PlatformError::invalid_input(msg.clone()).is_retryable());
        prop_assert!(!PlatformError::internal(msg).is_retryable());
    }
}
