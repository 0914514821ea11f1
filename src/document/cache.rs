//! Downloaded document cache

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use url::Url;

struct CacheInner {
    documents: LruCache<Url, Vec<u8>>,
    total_bytes: usize,
}

/// Downloaded documents keyed by the URL they were fetched from, so a
/// different backend never serves bytes stored for another one.
/// Bounded by entry count and byte budget.
pub struct DocumentCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl DocumentCache {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                documents: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Remember a downloaded document. Returns `false` when the document is
    /// larger than the whole budget and was not stored.
    pub fn store(&self, url: &Url, data: Vec<u8>) -> bool {
        let size = data.len();
        if size > self.max_bytes {
            tracing::debug!(url = %url, bytes = size, "document too large to cache");
            return false;
        }

        let mut inner = self.inner.lock();
        if let Some(previous) = inner.documents.pop(url) {
            inner.total_bytes -= previous.len();
        }

        while inner.total_bytes + size > self.max_bytes {
            let Some((evicted_url, evicted)) = inner.documents.pop_lru() else {
                break;
            };
            tracing::debug!(url = %evicted_url, "evicted cached document");
            inner.total_bytes -= evicted.len();
        }

        inner.total_bytes += size;
        // At entry capacity the LRU hands back the document it pushed out
        if let Some((_, evicted)) = inner.documents.push(url.clone(), data) {
            inner.total_bytes -= evicted.len();
        }
        true
    }

    /// Cached bytes for `url`, marking them recently used
    pub fn lookup(&self, url: &Url) -> Option<Vec<u8>> {
        self.inner.lock().documents.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
