//! TTL-bounded LRU storage for rendered responses.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A stored response: enough to replay it byte-identically.
#[derive(Clone)]
pub struct CachedPage {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    stored_at: Instant,
}

impl CachedPage {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Instant::now(),
        }
    }

    fn expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Response cache keyed by full request path (including the query string).
/// Entries expire after the configured TTL; `clear` drops everything at
/// once. Last-write-wins on concurrent population is fine because the
/// content is idempotently derivable from the store.
pub struct PageCache {
    entries: RwLock<LruCache<String, CachedPage>>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
            ttl: config.ttl(),
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedPage> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(page) if !page.expired(self.ttl) => Some(page.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, page: CachedPage) {
        rw_write(&self.entries, SOURCE, "insert").put(key, page);
    }

    /// Drop every entry regardless of remaining TTL.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
