//! Self-refreshing public key cache.
//!
//! Serves verification keys by id while keeping calls to the well-known
//! keys endpoint rare. Lookups for an unknown key id refresh synchronously
//! (the caller needs the freshly rotated key right now); lookups against a
//! merely stale cache refresh in the background and serve the current
//! entry immediately. All refreshes are rate-limited by
//! `maximum_refresh_interval` so a flood of bogus key ids cannot hammer
//! the endpoint.

use crate::client::KeyFetcher;
use crate::error::SigningError;
use crate::keys::PublicKeyEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Configuration for the public key cache.
#[derive(Debug, Clone)]
pub struct PublicKeyCacheConfig {
    /// How long a successful refresh stays fresh before a background
    /// refresh is triggered.
    pub ttl: Duration,

    /// Minimum interval between refresh attempts, successful or not.
    /// Bounds outbound calls even under a flood of unknown key ids.
    pub maximum_refresh_interval: Duration,
}

impl Default for PublicKeyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            maximum_refresh_interval: Duration::from_secs(10 * 60),
        }
    }
}

struct CacheState {
    /// Materialized verification keys by key id.
    keys: HashMap<String, Arc<PublicKeyEntry>>,

    /// When a refresh was last attempted, successful or not.
    last_refresh_attempt: Option<Instant>,

    /// When a refresh last completed successfully.
    last_successful_refresh: Option<Instant>,
}

struct CacheInner {
    fetcher: Arc<dyn KeyFetcher>,
    config: PublicKeyCacheConfig,
    state: RwLock<CacheState>,

    /// Mutual-exclusion guard: set while a refresh is in flight. A caller
    /// that loses the check-then-set race returns without starting a
    /// second fetch. Best effort, not a strict single-flight barrier.
    refreshing: AtomicBool,
}

/// Concurrency-safe cache of the platform's published verification keys.
///
/// Cheap to clone; clones share the same state. The cache is an
/// explicitly constructed object injected where needed, and its lifetime is
/// bounded by the process, with no global singleton involved.
///
/// # Example
///
/// ```rust,no_run
/// use handoff_signing::{HttpKeyFetcher, PublicKeyCache, PublicKeyCacheConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// async fn example() {
///     let fetcher = HttpKeyFetcher::new("https://handoff.example.com", Duration::from_secs(5));
///     let cache = PublicKeyCache::new(Arc::new(fetcher), PublicKeyCacheConfig::default());
///
///     if let Some(key) = cache.get_key("2024-01").await {
///         println!("key {} uses {}", key.key_id, key.algorithm);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct PublicKeyCache {
    inner: Arc<CacheInner>,
}

impl PublicKeyCache {
    /// Create a new cache backed by the given fetcher.
    pub fn new(fetcher: Arc<dyn KeyFetcher>, config: PublicKeyCacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                config,
                state: RwLock::new(CacheState {
                    keys: HashMap::new(),
                    last_refresh_attempt: None,
                    last_successful_refresh: None,
                }),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Look up a verification key by id.
    ///
    /// Triggers the refresh policy first, then consults the map. An
    /// unknown key id is a normal `None`, never an error: bogus ids are
    /// an expected, frequent input on the verification path.
    pub async fn get_key(&self, key_id: &str) -> Option<Arc<PublicKeyEntry>> {
        self.maybe_refresh(key_id).await;
        self.inner.state.read().await.keys.get(key_id).cloned()
    }

    /// Number of currently cached keys.
    pub async fn key_count(&self) -> usize {
        self.inner.state.read().await.keys.len()
    }

    /// Apply the refresh policy for a lookup of `key_id`.
    ///
    /// - No-op if a refresh was attempted within `maximum_refresh_interval`.
    /// - Unknown key id: refresh synchronously and await it.
    /// - Known key but cache older than `ttl`: refresh in the background,
    ///   serving the current (possibly slightly stale) entry meanwhile.
    async fn maybe_refresh(&self, key_id: &str) {
        let (throttled, known, stale) = {
            let state = self.inner.state.read().await;
            let throttled = state
                .last_refresh_attempt
                .map_or(false, |at| at.elapsed() < self.inner.config.maximum_refresh_interval);
            let known = state.keys.contains_key(key_id);
            let stale = state
                .last_successful_refresh
                .map_or(true, |at| at.elapsed() >= self.inner.config.ttl);
            (throttled, known, stale)
        };

        if throttled {
            return;
        }

        if !known {
            // The caller needs a freshly rotated key immediately.
            self.refresh().await;
        } else if stale {
            let cache = self.clone();
            tokio::spawn(async move {
                cache.refresh().await;
            });
        }
    }

    /// Run a refresh unless one is already in flight.
    ///
    /// Fetch failures never reach lookups: the existing cache is left
    /// untouched and the error is logged.
    async fn refresh(&self) {
        if self
            .inner
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // Another refresh is running; read whatever it leaves behind.
            return;
        }

        if let Err(e) = self.refresh_keys().await {
            if e.is_transient() {
                warn!(error = %e, "Public key refresh failed; keeping previously cached keys");
            } else {
                error!(error = %e, "Public key refresh hit a configuration or data error");
            }
        }

        self.inner.refreshing.store(false, Ordering::SeqCst);
    }

    async fn refresh_keys(&self) -> Result<(), SigningError> {
        {
            let mut state = self.inner.state.write().await;
            state.last_refresh_attempt = Some(Instant::now());
        }

        let listing = self.inner.fetcher.fetch_keys().await?;
        if listing.keys.is_empty() {
            return Err(SigningError::NoKeysFound);
        }

        let now_unix = chrono::Utc::now().timestamp();
        let mut state = self.inner.state.write().await;

        let mut keys = HashMap::with_capacity(listing.keys.len());
        for published in &listing.keys {
            if published.is_expired(now_unix) {
                debug!(key_id = %published.kid, "Dropping expired published key");
                continue;
            }

            // Keys already cached keep the same materialized entry so the
            // verification key material is not rebuilt on every refresh.
            if let Some(existing) = state.keys.get(&published.kid) {
                keys.insert(published.kid.clone(), existing.clone());
                continue;
            }

            // Bad published material is a data error in that one key, not
            // a reason to drop the valid keys listed alongside it.
            match PublicKeyEntry::from_published(published) {
                Ok(entry) => {
                    debug!(key_id = %entry.key_id, algorithm = %entry.algorithm, "Materialized new verification key");
                    keys.insert(published.kid.clone(), Arc::new(entry));
                }
                Err(e) => {
                    error!(key_id = %published.kid, error = %e, "Ignoring published key with invalid material");
                }
            }
        }

        state.keys = keys;
        state.last_successful_refresh = Some(Instant::now());

        debug!(count = state.keys.len(), "Public key cache refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SigningResult;
    use crate::keys::{PublishedKey, WellKnownKeys};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    // 2048-bit RSA modulus matching the exponent 65537 ("AQAB").
    const TEST_MODULUS: &str = "uPrq4lKLgqOo9mZky3ME49OH3klo7IePBNz8U9jDSKcXW3ZupYFhYwkxve-n6PQ15QVpCWUIxxarcu2vQ31evDbVv4vKVPnTAN9Xwqtmdnjevzyr2dqOMFtyGS_5rH-E058461DKHJ_I3KdS5zp5Y2ns3QrfSYhJecq8j4QVvgw84emmSrZslW57BN1LoLmPkSiW2JjXl5XCniD4KWqrwSMnWj0fRqLJq9pDw-VwfgXVeXPGImJ7GfzdiIjfrDyP_aE6cvIpGpkS5pxb25GhwppZWWM8QsoPeWU77z5irafO9cqyeHGxL3C7AL8p_opGPLU8v_n50wAKI4yq61l46Q";

    fn published_key(kid: &str, ed: i64) -> PublishedKey {
        PublishedKey {
            kid: kid.to_string(),
            n: TEST_MODULUS.to_string(),
            e: "AQAB".to_string(),
            alg: "RS256".to_string(),
            ed,
        }
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    /// Fetcher serving a fixed listing, counting outbound calls.
    struct CountingFetcher {
        listing: WellKnownKeys,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(keys: Vec<PublishedKey>) -> Arc<Self> {
            Arc::new(Self {
                listing: WellKnownKeys { keys },
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyFetcher for CountingFetcher {
        async fn fetch_keys(&self) -> SigningResult<WellKnownKeys> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.listing.clone())
        }
    }

    /// Fetcher that serves a listing until told to start failing.
    struct SwitchableFetcher {
        listing: WellKnownKeys,
        failing: AtomicBool,
    }

    impl SwitchableFetcher {
        fn new(keys: Vec<PublishedKey>) -> Arc<Self> {
            Arc::new(Self {
                listing: WellKnownKeys { keys },
                failing: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl KeyFetcher for SwitchableFetcher {
        async fn fetch_keys(&self) -> SigningResult<WellKnownKeys> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SigningError::Internal("endpoint unreachable".to_string()));
            }
            Ok(self.listing.clone())
        }
    }

    fn throttle_free_config() -> PublicKeyCacheConfig {
        PublicKeyCacheConfig {
            ttl: Duration::from_secs(24 * 60 * 60),
            maximum_refresh_interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_unknown_key_triggers_synchronous_refresh() {
        let fetcher = CountingFetcher::new(vec![published_key("2024-01", far_future())]);
        let cache = PublicKeyCache::new(fetcher.clone(), PublicKeyCacheConfig::default());

        let entry = cache.get_key("2024-01").await.unwrap();
        assert_eq!(entry.key_id, "2024-01");
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_throttling_bounds_outbound_calls() {
        let fetcher = CountingFetcher::new(vec![published_key("2024-01", far_future())]);
        let cache = PublicKeyCache::new(fetcher.clone(), PublicKeyCacheConfig::default());

        // Two consecutive lookups for a key id that is never published:
        // the first refreshes, the second is inside the refresh interval.
        assert!(cache.get_key("bogus-1").await.is_none());
        assert!(cache.get_key("bogus-2").await.is_none());

        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_known_fresh_key_served_without_fetch() {
        let fetcher = CountingFetcher::new(vec![published_key("2024-01", far_future())]);
        let cache = PublicKeyCache::new(fetcher.clone(), throttle_free_config());

        assert!(cache.get_key("2024-01").await.is_some());
        assert!(cache.get_key("2024-01").await.is_some());

        // Second lookup is a fresh-cache hit even with throttling disabled.
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_published_keys_are_dropped() {
        let expired = chrono::Utc::now().timestamp() - 60;
        let fetcher = CountingFetcher::new(vec![
            published_key("old", expired),
            published_key("current", far_future()),
        ]);
        let cache = PublicKeyCache::new(fetcher, PublicKeyCacheConfig::default());

        assert!(cache.get_key("current").await.is_some());
        assert_eq!(cache.key_count().await, 1);
        // Throttled now, but the map provably never held the expired key.
        assert!(cache.get_key("old").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_published_key_does_not_block_valid_keys() {
        // A listing that mixes one key with an unsupported algorithm into
        // otherwise valid keys must still yield the valid keys.
        let mut unsupported = published_key("legacy", far_future());
        unsupported.alg = "ES256".to_string();
        let fetcher = CountingFetcher::new(vec![
            unsupported,
            published_key("good", far_future()),
        ]);
        let cache = PublicKeyCache::new(fetcher.clone(), PublicKeyCacheConfig::default());

        let entry = cache.get_key("good").await.unwrap();
        assert_eq!(entry.key_id, "good");
        assert_eq!(cache.key_count().await, 1);
        assert_eq!(fetcher.call_count(), 1);
        assert!(cache.get_key("legacy").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_key_material_does_not_block_valid_keys() {
        let mut broken = published_key("broken", far_future());
        broken.n = "not base64url!!".to_string();
        let fetcher = CountingFetcher::new(vec![
            broken,
            published_key("good", far_future()),
        ]);
        let cache = PublicKeyCache::new(fetcher, PublicKeyCacheConfig::default());

        assert!(cache.get_key("good").await.is_some());
        assert!(cache.get_key("broken").await.is_none());
        assert_eq!(cache.key_count().await, 1);
    }

    #[tokio::test]
    async fn test_existing_entries_retained_across_refreshes() {
        let fetcher = CountingFetcher::new(vec![published_key("2024-01", far_future())]);
        let cache = PublicKeyCache::new(fetcher.clone(), throttle_free_config());

        let first = cache.get_key("2024-01").await.unwrap();

        // Unknown id with throttling disabled forces a second full refresh.
        assert!(cache.get_key("bogus").await.is_none());
        assert_eq!(fetcher.call_count(), 2);

        let second = cache.get_key("2024-01").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_existing_keys() {
        let fetcher = SwitchableFetcher::new(vec![published_key("2024-01", far_future())]);
        let cache = PublicKeyCache::new(fetcher.clone(), throttle_free_config());
        assert!(cache.get_key("2024-01").await.is_some());

        // Endpoint goes down; an unknown-key lookup forces a refresh that
        // fails, and the previously cached key keeps being served.
        fetcher.failing.store(true, Ordering::SeqCst);
        assert!(cache.get_key("bogus").await.is_none());
        assert!(cache.get_key("2024-01").await.is_some());
        assert_eq!(cache.key_count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_listing_leaves_cache_untouched() {
        let fetcher = CountingFetcher::new(vec![]);
        let cache = PublicKeyCache::new(fetcher.clone(), throttle_free_config());

        assert!(cache.get_key("2024-01").await.is_none());
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(cache.key_count().await, 0);
    }

    #[tokio::test]
    async fn test_stale_cache_refreshes_in_background() {
        let fetcher = CountingFetcher::new(vec![published_key("2024-01", far_future())]);
        let config = PublicKeyCacheConfig {
            ttl: Duration::ZERO,
            maximum_refresh_interval: Duration::ZERO,
        };
        let cache = PublicKeyCache::new(fetcher.clone(), config);

        // Learn the key, then look it up again: the entry comes back
        // immediately while a background refresh fires.
        assert!(cache.get_key("2024-01").await.is_some());
        assert!(cache.get_key("2024-01").await.is_some());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fetcher.call_count() >= 2);
    }
}
