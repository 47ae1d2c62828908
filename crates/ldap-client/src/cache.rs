//! Search result caching.
//!
//! A cache keyed by [`SearchKey`] lets repeated identical searches skip the
//! directory. Entries expire after a fixed time-to-live and the least
//! recently used entry is evicted once the cache is full.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use ldap_protocol::{SearchKey, SearchResult};
use lru::LruCache;
use parking_lot::Mutex;

/// Storage for search results.
pub trait SearchCache: Send + Sync + fmt::Debug {
    /// Cached result for `key`, if present and fresh.
    fn get(&self, key: &SearchKey) -> Option<SearchResult>;

    /// Store `result` under `key`.
    fn put(&self, key: SearchKey, result: SearchResult);

    /// Drop every cached result.
    fn clear(&self);
}

/// Bounded LRU search cache with a time-to-live.
pub struct LruSearchCache {
    entries: Mutex<LruCache<SearchKey, (Instant, SearchResult)>>,
    ttl: Duration,
}

impl LruSearchCache {
    /// Cache holding at most `capacity` results, each valid for `ttl`.
    #[must_use]
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Number of cached results, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SearchCache for LruSearchCache {
    fn get(&self, key: &SearchKey) -> Option<SearchResult> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some((stored, result)) if stored.elapsed() <= self.ttl => return Some(result.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn put(&self, key: SearchKey, result: SearchResult) {
        self.entries.lock().put(key, (Instant::now(), result));
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl fmt::Debug for LruSearchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("LruSearchCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .field("ttl", &self.ttl)
            .finish()
    }
}
