//! Cache Store Module
//!
//! Thread-safe wrapper serializing every operation on one [`LruCache`].

use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache};

#[derive(Debug)]
struct Inner {
    lru: LruCache,
    stats: CacheStats,
}

// == Concurrent Cache ==
/// One logical cache: an LRU store behind a single exclusive lock.
///
/// A read promotes recency and may drop an expired entry, so reads take
/// the same lock as writes. The lock is only held for the in-memory
/// operation, never across I/O.
///
/// The backing store allocates nothing until the first write, so an
/// unused cache costs only its bookkeeping.
#[derive(Debug)]
pub struct ConcurrentCache {
    inner: Mutex<Inner>,
}

impl ConcurrentCache {
    // == Constructor ==
    /// Creates a cache that will hold at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru: LruCache::new(capacity),
                stats: CacheStats::new(),
            }),
        }
    }

    // == Get ==
    /// Returns the live value for `key`, recording a hit or miss.
    ///
    /// `None` is the signal for the caller to load the value itself.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let value = inner.lru.get(key);
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Add ==
    /// Stores `value` under `key` with the default TTL.
    pub fn add(&self, key: impl Into<String>, value: ByteView) {
        self.add_with_expire(key, value, Duration::ZERO);
    }

    // == Add With Expire ==
    /// Stores `value` under `key`, expiring after `ttl` (zero = default TTL).
    pub fn add_with_expire(&self, key: impl Into<String>, value: ByteView, ttl: Duration) {
        let mut inner = self.inner.lock();
        if inner.lru.add_with_expire(key, value, ttl) {
            inner.stats.record_eviction();
        }
    }

    /// Removes `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().lru.remove(key)
    }

    // == Default TTL ==
    /// Sets the TTL applied to future writes that carry no explicit TTL.
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.inner.lock().lru.set_default_ttl(ttl);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats;
        stats.set_total_entries(inner.lru.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::thread::sleep;

    #[test]
    fn test_get_before_any_write_misses() {
        let cache = ConcurrentCache::new(10);

        assert!(cache.get("anything").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_add_then_get_observes_write() {
        let cache = ConcurrentCache::new(10);
        cache.add("Tom", ByteView::from("630"));

        assert_eq!(cache.get("Tom"), Some(ByteView::from("630")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_default_ttl_before_first_write() {
        let cache = ConcurrentCache::new(10);
        cache.set_default_ttl(Duration::from_millis(100));
        cache.add("k", ByteView::from("v"));

        assert!(cache.get("k").is_some());
        sleep(Duration::from_millis(150));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_explicit_ttl_overrides_default() {
        let cache = ConcurrentCache::new(10);
        cache.set_default_ttl(Duration::from_millis(50));
        cache.add_with_expire("k", ByteView::from("v"), Duration::from_secs(60));

        sleep(Duration::from_millis(80));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_huge_default_ttl_is_stored() {
        let cache = ConcurrentCache::new(2);
        cache.set_default_ttl(Duration::from_secs(u64::MAX));
        cache.add("k", ByteView::from("v"));

        assert_eq!(cache.get("k"), Some(ByteView::from("v")));
    }

    #[test]
    fn test_remove() {
        let cache = ConcurrentCache::new(10);
        cache.add("k", ByteView::from("v"));

        assert!(cache.remove("k"));
        assert!(!cache.remove("k"));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_stats_track_hits_misses_evictions() {
        let cache = ConcurrentCache::new(2);
        cache.add("a", ByteView::from("1"));
        cache.add("b", ByteView::from("2"));
        cache.add("c", ByteView::from("3"));

        cache.get("c");
        cache.get("a");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = Arc::new(ConcurrentCache::new(64));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("t{}-k{}", t, i % 100);
                        cache.add(key.clone(), ByteView::from(key.clone()));
                        if let Some(value) = cache.get(&key) {
                            // Values are never torn: a key always maps to its own bytes
                            assert_eq!(value.as_slice(), key.as_bytes());
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 8 * 500);
    }
}
