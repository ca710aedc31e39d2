//! Shape-text cache using moka
//!
//! Keeps fetched shape documents by URL so repeated descriptor loads do not
//! refetch. Owned by whichever component composes discovery; there is no
//! process-wide instance.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// URL-keyed cache of shape document text
#[derive(Debug, Clone)]
pub struct ShapeTextCache {
    inner: Cache<String, Arc<str>>,
}

impl ShapeTextCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache whose entries expire after `ttl`
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Store text for a URL
    #[inline]
    pub async fn insert(&self, url: impl Into<String>, text: Arc<str>) {
        self.inner.insert(url.into(), text).await;
    }

    /// Cached text for a URL
    #[inline]
    pub async fn get(&self, url: &str) -> Option<Arc<str>> {
        self.inner.get(url).await
    }

    /// Drop one URL
    #[inline]
    pub async fn invalidate(&self, url: &str) {
        self.inner.invalidate(url).await;
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Check if a URL is cached
    #[inline]
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.inner.contains_key(url)
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ShapeTextCache {
    /// Create cache with default capacity (256 documents)
    fn default() -> Self {
        Self::new(256)
    }
}
