//! In-memory preview cache with LRU eviction.
//!
//! The cache is a plain data structure and is not internally synchronized.
//! [`PreviewService`](super::PreviewService) owns the single instance behind
//! a mutex and is the only writer.

use lru::LruCache;
use std::num::NonZeroUsize;

use super::payload::PreviewSrc;

/// Default number of previews kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned a payload
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Returns the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded mapping from resource identity to preview payload.
///
/// Both `get` hits and `put` make the key the most recent entry. Once an
/// insert pushes the entry count past capacity, the least recently used
/// entry is evicted, so `len() <= capacity()` holds after every mutation.
pub struct PreviewCache {
    entries: LruCache<String, PreviewSrc>,
    stats: CacheStats,
}

impl PreviewCache {
    /// Create a cache holding at most `capacity` previews.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a preview, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<PreviewSrc> {
        match self.entries.get(key) {
            Some(src) => {
                self.stats.hits += 1;
                Some(src.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite a preview, evicting the oldest entry if full.
    pub fn put(&mut self, key: impl Into<String>, src: PreviewSrc) {
        let key = key.into();
        if let Some((displaced, _)) = self.entries.push(key.clone(), src) {
            if displaced != key {
                self.stats.evictions += 1;
                tracing::trace!(evicted = %displaced, "Preview cache eviction");
            }
        }
    }

    /// Check for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::FontMime;

    fn src(byte: u8) -> PreviewSrc {
        PreviewSrc::new(FontMime::Ttf, vec![byte; 4])
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = PreviewCache::new(10);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut cache = PreviewCache::new(0);
        cache.put("a", src(1));
        cache.put("b", src(2));

        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = PreviewCache::new(10);
        cache.put("/fonts/a.ttf", src(1));

        assert_eq!(cache.get("/fonts/a.ttf"), Some(src(1)));
        assert_eq!(cache.get("/fonts/missing.ttf"), None);
    }

    #[test]
    fn test_put_overwrites_with_latest_payload() {
        let mut cache = PreviewCache::new(10);
        cache.put("a", src(1));
        cache.put("a", src(2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(src(2)));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_capacity_two_evicts_oldest() {
        let mut cache = PreviewCache::new(2);
        cache.put("a", src(1));
        cache.put("b", src(2));
        cache.put("c", src(3));

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_promotes_to_most_recent() {
        let mut cache = PreviewCache::new(2);
        cache.put("a", src(1));
        cache.put("b", src(2));

        // Touch "a" so that "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.put("c", src(3));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert_eq!(cache.keys(), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_contains_does_not_promote() {
        let mut cache = PreviewCache::new(2);
        cache.put("a", src(1));
        cache.put("b", src(2));

        assert!(cache.contains("a"));
        cache.put("c", src(3));

        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut cache = PreviewCache::new(DEFAULT_CACHE_CAPACITY);
        for i in 0..500u32 {
            cache.put(format!("/fonts/{}.ttf", i % 137), src((i % 251) as u8));
            assert!(cache.len() <= DEFAULT_CACHE_CAPACITY);
        }
        assert_eq!(cache.len(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let mut cache = PreviewCache::new(4);
        cache.put("a", src(1));
        let _ = cache.get("a");
        let _ = cache.get("a");
        let _ = cache.get("b");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_clear_removes_entries() {
        let mut cache = PreviewCache::new(4);
        cache.put("a", src(1));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
