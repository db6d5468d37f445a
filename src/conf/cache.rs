//! Per-key TTL cache for persisted option values

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-local cache of option reads, keyed by `(owner, key)`
///
/// Staleness is judged per entry against the ttl the caller passes in; there
/// is no background sweep. An entry whose age equals the ttl is stale.
#[derive(Debug, Default)]
pub struct OptionCache {
    inner: Mutex<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<(i64, String), CacheEntry>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// Last read value; `None` records that the store had no entry
    value: Option<Value>,
    fetched_at: Instant,
}

impl OptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached read for `(owner, key)` if it is younger than `ttl_secs`
    ///
    /// The outer `Option` is the cache outcome; the inner one is the cached
    /// store result.
    pub fn lookup(&self, owner_id: i64, key: &str, ttl_secs: u64) -> Option<Option<Value>> {
        let mut inner = self.inner.lock().expect("option cache lock poisoned");
        let ttl = Duration::from_secs(ttl_secs);

        let fresh = inner
            .entries
            .get(&(owner_id, key.to_string()))
            .filter(|entry| ttl_secs > 0 && entry.fetched_at.elapsed() < ttl)
            .map(|entry| entry.value.clone());

        match fresh {
            Some(value) => {
                inner.hits += 1;
                debug!("Option cache hit: {} (owner {})", key, owner_id);
                Some(value)
            }
            None => {
                inner.misses += 1;
                debug!("Option cache miss: {} (owner {})", key, owner_id);
                None
            }
        }
    }

    /// Record a fresh read, replacing any previous entry
    pub fn store(&self, owner_id: i64, key: &str, value: Option<Value>) {
        let mut inner = self.inner.lock().expect("option cache lock poisoned");
        inner.entries.insert(
            (owner_id, key.to_string()),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `(owner, key)`; returns whether one existed
    pub fn evict(&self, owner_id: i64, key: &str) -> bool {
        let mut inner = self.inner.lock().expect("option cache lock poisoned");
        inner.entries.remove(&(owner_id, key.to_string())).is_some()
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("option cache lock poisoned");
        *inner = CacheInner::default();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("option cache lock poisoned");
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached reads
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to go to the store
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = OptionCache::new();
        cache.store(1, "FOO_BAR", Some(json!("foo")));

        assert_eq!(cache.lookup(1, "FOO_BAR", 0), None);
        assert_eq!(cache.stats().entries, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = OptionCache::new();
        cache.store(1, "FOO_BAR", Some(json!("foo")));
        cache.store(1, "EMPTY", None);

        assert_eq!(cache.lookup(1, "FOO_BAR", 10), Some(Some(json!("foo"))));
        assert_eq!(cache.lookup(1, "EMPTY", 10), Some(None));
        assert_eq!(cache.lookup(2, "FOO_BAR", 10), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_expired_entry_is_stale() {
        let cache = OptionCache::new();
        cache.store(1, "FOO_BAR", Some(json!("foo")));

        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(cache.lookup(1, "FOO_BAR", 1), None);
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = OptionCache::new();
        cache.store(1, "A", Some(json!(1)));
        cache.store(1, "B", Some(json!(2)));

        assert!(cache.evict(1, "A"));
        assert!(!cache.evict(1, "A"));
        assert_eq!(cache.lookup(1, "A", 10), None);

        cache.clear();
        assert_eq!(cache.stats(), CacheStats { entries: 0, hits: 0, misses: 0 });
    }
}
