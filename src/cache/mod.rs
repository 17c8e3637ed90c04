use std::time::Duration;

use moka::{policy::EvictionPolicy, sync::Cache};
use tokio::time::Instant;
use tracing::debug;

use crate::configs::CacheConfig;

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Resolved stream URLs keyed by media identifier.
///
/// Capacity and time-to-live are enforced by moka with an LRU policy. Reads
/// also check the entry age against the tokio clock, so an entry is never
/// returned past its TTL even before moka's housekeeping drops it.
pub struct StreamCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
}

impl StreamCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries.max(1) as u64)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { entries, ttl }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    pub fn get(&self, id: &str) -> Option<String> {
        let entry = self.entries.get(id)?;
        if entry.is_fresh(Instant::now(), self.ttl) {
            return Some(entry.url);
        }

        self.entries.invalidate(id);
        debug!("Cache entry for {} expired", id);
        None
    }

    pub fn put(&self, id: &str, url: impl Into<String>) {
        self.entries.insert(
            id.to_string(),
            CacheEntry {
                url: url.into(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Entry count after applying pending evictions.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
