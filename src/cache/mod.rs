//! Render cache keyed by content hash
//!
//! Rendered HTML is remembered per markdown text for a limited time so that
//! repeated page requests for the same post skip parsing. Entries older than
//! the TTL are never served; they are swept out once the cache grows past its
//! capacity.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Default lifetime of a rendered entry
pub const DEFAULT_RENDER_TTL: Duration = Duration::from_secs(5 * 60);

/// Size above which stale entries are swept
pub const DEFAULT_RENDER_CAPACITY: usize = 100;

/// Digest identifying a markdown text
pub type ContentHash = blake3::Hash;

/// Calculate a hash for content
pub fn hash_content(content: &str) -> ContentHash {
    blake3::hash(content.as_bytes())
}

struct CacheEntry {
    html: Arc<str>,
    rendered_at: Instant,
}

/// Shared cache of rendered markdown
pub struct RenderCache {
    entries: Mutex<HashMap<ContentHash, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl RenderCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
            clock,
        }
    }

    /// Fresh rendered HTML for the key, if any
    pub fn get(&self, key: &ContentHash) -> Option<Arc<str>> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| now.duration_since(entry.rendered_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.html))
    }

    /// Store rendered HTML, sweeping stale entries when over capacity
    pub fn insert(&self, key: ContentHash, html: Arc<str>) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                html,
                rendered_at: now,
            },
        );

        if entries.len() > self.capacity {
            let before = entries.len();
            entries.retain(|_, entry| now.duration_since(entry.rendered_at) < self.ttl);
            tracing::debug!(
                "Render cache swept {} stale entries ({} kept)",
                before - entries.len(),
                entries.len()
            );
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock),
            DEFAULT_RENDER_TTL,
            DEFAULT_RENDER_CAPACITY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache() -> (RenderCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = RenderCache::new(clock.clone(), DEFAULT_RENDER_TTL, 3);
        (cache, clock)
    }

    #[test]
    fn test_hash_stability() {
        assert_eq!(hash_content("# Hello"), hash_content("# Hello"));
        assert_ne!(hash_content("# Hello"), hash_content("# Hello!"));
    }

    #[test]
    fn test_get_fresh_entry() {
        let (cache, clock) = cache();
        let key = hash_content("a");
        cache.insert(key, Arc::from("<p>a</p>"));

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get(&key).as_deref(), Some("<p>a</p>"));
    }

    #[test]
    fn test_stale_entry_not_served() {
        let (cache, clock) = cache();
        let key = hash_content("a");
        cache.insert(key, Arc::from("<p>a</p>"));

        clock.advance(DEFAULT_RENDER_TTL);
        assert!(cache.get(&key).is_none());
        // Still held until a sweep
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_over_capacity() {
        let (cache, clock) = cache();
        for text in ["a", "b", "c"] {
            cache.insert(hash_content(text), Arc::from(text));
        }
        clock.advance(Duration::from_secs(301));
        cache.insert(hash_content("d"), Arc::from("d"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&hash_content("d")).is_some());
    }

    #[test]
    fn test_fresh_entries_survive_sweep() {
        let (cache, _) = cache();
        for text in ["a", "b", "c", "d"] {
            cache.insert(hash_content(text), Arc::from(text));
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache();
        cache.insert(hash_content("a"), Arc::from("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
