//! Debounced prefetching of previews from UI hints.
//!
//! Hover and focus events fire at pointer speed. Each hint (re)starts a short
//! per-key timer; only when a key has been quiet for the full delay does the
//! fetch actually run (trailing-edge debounce, last call wins).
//!
//! Keys that are already cached or already being fetched are ignored at
//! schedule time. The skip condition is not evaluated again on expiry, so the
//! fetch function handed to [`PrefetchScheduler::schedule`] must itself be
//! cache-first and coalescing (as `PreviewService::get_preview_src` is).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::cache::PreviewCache;
use super::coalesce::{FetchCoalescer, FetchOutcome};

/// Quiet period a key must see before its prefetch runs.
pub const DEFAULT_PREFETCH_DELAY: Duration = Duration::from_millis(120);

/// A pending debounce timer for one key.
struct PrefetchTimer {
    /// Distinguishes this timer from a later replacement for the same key
    id: u64,
    token: CancellationToken,
}

/// Prefetch statistics for monitoring.
#[derive(Debug, Default)]
pub struct PrefetchStats {
    /// Hints that started or restarted a timer
    pub scheduled: AtomicU64,
    /// Timers cancelled by a newer hint for the same key
    pub superseded: AtomicU64,
    /// Hints ignored because the key was cached or in flight
    pub skipped: AtomicU64,
    /// Timers that expired and triggered a fetch
    pub fired: AtomicU64,
    /// Fired fetches that failed (errors are otherwise discarded)
    pub failed: AtomicU64,
}

impl PrefetchStats {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> PrefetchStatsSnapshot {
        PrefetchStatsSnapshot {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            fired: self.fired.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of prefetch statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchStatsSnapshot {
    pub scheduled: u64,
    pub superseded: u64,
    pub skipped: u64,
    pub fired: u64,
    pub failed: u64,
}

/// Debounces prefetch hints per resource identity.
///
/// Timers run as tokio tasks, so `schedule` must be called from within a
/// runtime.
pub struct PrefetchScheduler {
    cache: Arc<Mutex<PreviewCache>>,
    coalescer: Arc<FetchCoalescer>,
    delay: Duration,
    timers: Arc<Mutex<HashMap<String, PrefetchTimer>>>,
    next_timer_id: AtomicU64,
    stats: Arc<PrefetchStats>,
}

impl PrefetchScheduler {
    /// Create a scheduler that consults `cache` and `coalescer` before arming
    /// a timer.
    pub fn new(
        cache: Arc<Mutex<PreviewCache>>,
        coalescer: Arc<FetchCoalescer>,
        delay: Duration,
    ) -> Self {
        Self {
            cache,
            coalescer,
            delay,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_timer_id: AtomicU64::new(0),
            stats: Arc::new(PrefetchStats::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Get access to the statistics for monitoring.
    pub fn stats(&self) -> Arc<PrefetchStats> {
        Arc::clone(&self.stats)
    }

    /// Number of keys with an armed timer.
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().len()
    }

    /// Arm (or re-arm) the debounce timer for `key`.
    ///
    /// When the timer expires, `fetch_fn(key)` is awaited on a background
    /// task and its result discarded.
    pub fn schedule<F, Fut>(&self, key: &str, fetch_fn: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        if self.cache.lock().contains(key) || self.coalescer.is_pending(key) {
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Prefetch hint ignored - already cached or in flight");
            return;
        }

        let id = self.next_timer_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let replaced = self.timers.lock().insert(
            key.to_string(),
            PrefetchTimer {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = replaced {
            previous.token.cancel();
            self.stats.superseded.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Prefetch timer restarted");
        }
        self.stats.scheduled.fetch_add(1, Ordering::Relaxed);

        let key = key.to_string();
        let delay = self.delay;
        let timers = Arc::clone(&self.timers);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = token.cancelled() => return,

                _ = tokio::time::sleep(delay) => {}
            }

            {
                let mut timers = timers.lock();
                match timers.get(&key) {
                    Some(timer) if timer.id == id => {
                        timers.remove(&key);
                    }
                    // Superseded between expiry and taking the lock
                    _ => return,
                }
            }

            stats.fired.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Prefetch timer fired");

            if let Err(e) = fetch_fn(key.clone()).await {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, error = %e, "Prefetch failed (ignored)");
            }
        });
    }

    /// Cancel every armed timer.
    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.timers.lock().drain().collect();
        for (key, timer) in drained {
            timer.token.cancel();
            trace!(key = %key, "Prefetch timer cancelled");
        }
    }
}

impl Drop for PrefetchScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
