//! Cache-first, coalesced preview acquisition.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use super::cache::{CacheStats, PreviewCache, DEFAULT_CACHE_CAPACITY};
use super::coalesce::{CoalescerStats, FetchCoalescer, FetchOutcome};
use super::prefetch::{PrefetchScheduler, PrefetchStatsSnapshot, DEFAULT_PREFETCH_DELAY};
use super::traits::ResourceFetcher;

/// Tunables for [`PreviewService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewServiceConfig {
    /// Maximum number of cached previews
    pub cache_capacity: usize,
    /// Debounce delay for prefetch hints
    pub prefetch_delay: Duration,
}

impl Default for PreviewServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            prefetch_delay: DEFAULT_PREFETCH_DELAY,
        }
    }
}

/// The cache + coalescer + fetcher triple, cheap to clone into tasks.
struct PreviewSource<F> {
    fetcher: Arc<F>,
    cache: Arc<Mutex<PreviewCache>>,
    coalescer: Arc<FetchCoalescer>,
}

impl<F> Clone for PreviewSource<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            cache: Arc::clone(&self.cache),
            coalescer: Arc::clone(&self.coalescer),
        }
    }
}

impl<F: ResourceFetcher> PreviewSource<F> {
    async fn get(&self, key: &str) -> FetchOutcome {
        let cached = self.cache.lock().get(key);
        if let Some(src) = cached {
            trace!(key, "Preview cache hit");
            return Ok(src);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);
        let owned_key = key.to_string();
        self.coalescer
            .acquire(key, move || async move {
                let src = fetcher.fetch(&owned_key).await?;
                // Written before the pending entry clears, so the key is
                // always either cached or in flight
                cache.lock().put(owned_key, src.clone());
                Ok(src)
            })
            .await
    }
}

/// Process-wide entry point for obtaining font previews.
///
/// Owns the single [`PreviewCache`], [`FetchCoalescer`] and
/// [`PrefetchScheduler`]. Must be used from within a tokio runtime.
pub struct PreviewService<F> {
    source: PreviewSource<F>,
    scheduler: PrefetchScheduler,
}

impl<F: ResourceFetcher> PreviewService<F> {
    pub fn new(fetcher: F, config: PreviewServiceConfig) -> Self {
        let cache = Arc::new(Mutex::new(PreviewCache::new(config.cache_capacity)));
        let coalescer = Arc::new(FetchCoalescer::new());
        let scheduler = PrefetchScheduler::new(
            Arc::clone(&cache),
            Arc::clone(&coalescer),
            config.prefetch_delay,
        );

        Self {
            source: PreviewSource {
                fetcher: Arc::new(fetcher),
                cache,
                coalescer,
            },
            scheduler,
        }
    }

    /// Get the preview payload for `identity`.
    ///
    /// Served from the cache when possible; otherwise joins or starts the
    /// single fetch for this identity. Successful fetches are cached, failures
    /// are not.
    pub async fn get_preview_src(&self, identity: &str) -> FetchOutcome {
        self.source.get(identity).await
    }

    /// Hint that `identity` is likely to be selected soon.
    ///
    /// Safe to call at any frequency; the fetch runs once the hint has been
    /// quiet for the prefetch delay. Failures are never surfaced.
    pub fn prefetch(&self, identity: &str) {
        let source = self.source.clone();
        self.scheduler
            .schedule(identity, move |key| async move { source.get(&key).await });
    }

    /// Returns true if `identity` is cached (does not affect recency).
    pub fn is_cached(&self, identity: &str) -> bool {
        self.source.cache.lock().contains(identity)
    }

    /// Returns true if a fetch for `identity` is in flight.
    pub fn is_pending(&self, identity: &str) -> bool {
        self.source.coalescer.is_pending(identity)
    }

    pub fn cached_len(&self) -> usize {
        self.source.cache.lock().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.source.cache.lock().stats()
    }

    pub fn coalescer_stats(&self) -> CoalescerStats {
        self.source.coalescer.stats()
    }

    pub fn prefetch_stats(&self) -> PrefetchStatsSnapshot {
        self.scheduler.stats().snapshot()
    }

    /// Log cache and coalescing statistics.
    pub fn log_stats(&self) {
        let cache = self.cache_stats();
        tracing::info!(
            entries = self.cached_len(),
            hits = cache.hits,
            misses = cache.misses,
            evictions = cache.evictions,
            hit_rate = format!("{:.1}%", cache.hit_rate() * 100.0),
            "Preview cache statistics"
        );
        self.source.coalescer.log_stats();
    }

    /// Drop every cached preview and cancel pending prefetch timers.
    pub fn clear(&self) {
        self.scheduler.cancel_all();
        self.source.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{FetchError, FontMime, PreviewSrc};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    /// Fetcher that counts calls and resolves after a fixed delay.
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        fail: bool,
    }

    impl ResourceFetcher for CountingFetcher {
        fn fetch(
            &self,
            identity: &str,
        ) -> impl Future<Output = Result<PreviewSrc, FetchError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delay;
            let fail = self.fail;
            let identity = identity.to_string();
            async move {
                sleep(delay).await;
                if fail {
                    Err(FetchError::NotFound {
                        path: identity.into(),
                    })
                } else {
                    Ok(PreviewSrc::new(FontMime::Ttf, identity.into_bytes()))
                }
            }
        }
    }

    fn service(delay_ms: u64, fail: bool) -> (Arc<PreviewService<CountingFetcher>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(delay_ms),
            fail,
        };
        (
            Arc::new(PreviewService::new(fetcher, PreviewServiceConfig::default())),
            calls,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_get_fetches_once_and_caches() {
        let (service, calls) = service(10, false);

        let src = service.get_preview_src("a").await.unwrap();
        assert_eq!(src.bytes().as_ref(), b"a");
        assert!(service.is_cached("a"));

        // Second call is a cache hit
        service.get_preview_src("a").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.cache_stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_gets_share_one_fetch() {
        let (service, calls) = service(100, false);

        let (a, b) = tokio::join!(service.get_preview_src("x"), service.get_preview_src("x"));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.coalescer_stats().coalesced_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let (service, calls) = service(10, true);

        assert!(service.get_preview_src("bad").await.is_err());
        assert!(!service.is_cached("bad"));
        assert!(!service.is_pending("bad"));

        assert!(service.get_preview_src("bad").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_populates_cache() {
        let (service, calls) = service(10, false);

        service.prefetch("y");
        sleep(Duration::from_millis(200)).await;

        assert!(service.is_cached("y"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_then_get_before_delay_fetches_once() {
        let (service, calls) = service(10, false);

        service.prefetch("z");
        service.get_preview_src("z").await.unwrap();
        sleep(Duration::from_millis(300)).await;

        // The timer fires, but the fetch function hits the cache
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_of_cached_key_is_noop() {
        let (service, calls) = service(10, false);
        service.get_preview_src("a").await.unwrap();

        service.prefetch("a");
        sleep(Duration::from_millis(200)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.prefetch_stats().skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_cache() {
        let (service, calls) = service(10, false);
        service.get_preview_src("a").await.unwrap();

        service.clear();
        service.get_preview_src("a").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
