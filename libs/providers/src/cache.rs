//! Process-wide catalog/pricing cache.
//!
//! Keyed on (provider, region, query shape) with a per-entry TTL.
//! Reads are lock-free; writes serialize per key inside the map. When an
//! entry has expired and the refresh fails, the last successful value is
//! served with an explicit `served_stale` flag.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use domain_costs::CloudProvider;
use observability::CacheMetrics;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::AdapterResult;

/// Cache key: one catalog query shape in one (provider, region) scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: CloudProvider,
    pub region: String,
    pub query_shape: String,
}

impl CacheKey {
    pub fn new(
        provider: CloudProvider,
        region: impl Into<String>,
        query_shape: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            region: region.into(),
            query_shape: query_shape.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

/// A cached value plus how it was served.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<T> {
    pub value: T,
    /// Served past its TTL because the refresh failed
    pub served_stale: bool,
    /// Served from the cache rather than a fresh fetch
    pub from_cache: bool,
}

/// TTL cache for read-only catalog snapshots.
pub struct CatalogCache<T: Clone> {
    entries: DashMap<CacheKey, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> CatalogCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a fresh entry without fetching.
    pub fn get_fresh(&self, key: &CacheKey) -> Option<T> {
        self.entries.get(key).and_then(|entry| {
            if entry.stored_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Resolve `key` from the cache, fetching on miss or expiry.
    ///
    /// A failed refresh falls back to the last successful value when one
    /// exists; the caller sees `served_stale = true` in that case.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> AdapterResult<CachedValue<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AdapterResult<T>>,
    {
        if let Some(value) = self.get_fresh(&key) {
            debug!(provider = %key.provider, region = %key.region, shape = %key.query_shape, "Catalog cache hit");
            CacheMetrics::record_hit(key.provider.to_string());
            return Ok(CachedValue {
                value,
                served_stale: false,
                from_cache: true,
            });
        }

        CacheMetrics::record_miss(key.provider.to_string());

        match fetch().await {
            Ok(value) => {
                self.entries.insert(
                    key,
                    CacheEntry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                    },
                );
                Ok(CachedValue {
                    value,
                    served_stale: false,
                    from_cache: false,
                })
            }
            Err(err) => {
                // Stale-on-error: an expired entry is better than nothing.
                if let Some(entry) = self.entries.get(&key) {
                    warn!(
                        provider = %key.provider,
                        region = %key.region,
                        shape = %key.query_shape,
                        error = %err,
                        "Catalog refresh failed, serving stale entry"
                    );
                    CacheMetrics::record_stale_served(key.provider.to_string());
                    return Ok(CachedValue {
                        value: entry.value.clone(),
                        served_stale: true,
                        from_cache: true,
                    });
                }
                Err(err)
            }
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;

    fn key() -> CacheKey {
        CacheKey::new(CloudProvider::Aws, "us-east-1", "instance_types")
    }

    fn fetch_error() -> AdapterError {
        AdapterError::Api {
            provider: "aws".into(),
            message: "boom".into(),
        }
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_secs(60));
        let result = cache
            .get_or_fetch(key(), || async { Ok(7u32) })
            .await
            .unwrap();
        assert_eq!(result.value, 7);
        assert!(!result.served_stale);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_fresh_entry_skips_fetch() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(key(), || async { Ok(7u32) })
            .await
            .unwrap();

        // Second resolve must not invoke the fetcher at all.
        let result = cache
            .get_or_fetch(key(), || async { unreachable!("fetch on warm cache") })
            .await
            .unwrap();
        assert_eq!(result.value, 7);
        assert!(!result.served_stale);
        assert!(result.from_cache);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_refetches() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_secs(10));
        cache
            .get_or_fetch(key(), || async { Ok(1u32) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let result = cache
            .get_or_fetch(key(), || async { Ok(2u32) })
            .await
            .unwrap();
        assert_eq!(result.value, 2);
        assert!(!result.served_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_served_when_refresh_fails() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_secs(10));
        cache
            .get_or_fetch(key(), || async { Ok(1u32) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let result = cache
            .get_or_fetch(key(), || async { Err(fetch_error()) })
            .await
            .unwrap();
        assert_eq!(result.value, 1);
        assert!(result.served_stale);
    }

    #[tokio::test]
    async fn test_error_with_no_prior_entry_propagates() {
        let cache: CatalogCache<u32> = CatalogCache::new(Duration::from_secs(10));
        let result = cache
            .get_or_fetch(key(), || async { Err(fetch_error()) })
            .await;
        assert!(result.is_err());
    }
}
