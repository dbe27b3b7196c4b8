//! Audit cache
//!
//! Keeps the latest audit per URL for a freshness window and a bounded
//! history of every audit of a URL. The server owns one cache and shares it
//! between requests; nothing here is global.

use crate::config::CacheConfig;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One cached audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Milliseconds since the Unix epoch when the audit finished
    pub timestamp: i64,

    /// The audit record
    pub data: Value,
}

impl CacheEntry {
    pub fn new(timestamp: i64, data: Value) -> Self {
        Self { timestamp, data }
    }
}

/// Latest-audit cache plus per-URL history
///
/// Implementations must be safe to share between request handlers.
pub trait AuditCache: Send + Sync {
    /// Returns the latest entry for `url` if it is still fresh at `now_ms`
    fn get(&self, url: &str, now_ms: i64) -> Option<CacheEntry>;

    /// Replaces the latest entry for `url`
    fn set(&self, url: &str, entry: CacheEntry);

    /// Appends an entry to the history of `url`
    fn append_history(&self, url: &str, entry: CacheEntry);

    /// All history entries for `url`, oldest first
    fn history(&self, url: &str) -> Vec<CacheEntry>;
}

struct CacheState {
    latest: LruCache<String, CacheEntry>,
    history: LruCache<String, VecDeque<CacheEntry>>,
}

/// In-process cache bounded by entry count, history length and TTL
pub struct MemoryCache {
    state: Mutex<CacheState>,
    ttl_ms: i64,
    max_history: usize,
}

impl MemoryCache {
    /// Creates a cache with the bounds from `config`
    ///
    /// Zero sizes are raised to one.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        let ttl_ms = i64::try_from(config.ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);

        Self {
            state: Mutex::new(CacheState {
                latest: LruCache::new(capacity),
                history: LruCache::new(capacity),
            }),
            ttl_ms,
            max_history: config.max_history.max(1),
        }
    }

    /// Number of URLs with a latest entry, fresh or not
    pub fn len(&self) -> usize {
        self.lock().latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl AuditCache for MemoryCache {
    fn get(&self, url: &str, now_ms: i64) -> Option<CacheEntry> {
        let mut state = self.lock();
        let entry = state.latest.get(url)?;

        if now_ms.saturating_sub(entry.timestamp) < self.ttl_ms {
            Some(entry.clone())
        } else {
            tracing::debug!("Cached audit for {} is stale", url);
            None
        }
    }

    fn set(&self, url: &str, entry: CacheEntry) {
        let mut state = self.lock();
        if let Some((evicted, _)) = state.latest.push(url.to_string(), entry) {
            if evicted != url {
                tracing::debug!("Evicted cached audit for {}", evicted);
            }
        }
    }

    fn append_history(&self, url: &str, entry: CacheEntry) {
        let mut state = self.lock();
        let max_history = self.max_history;

        let entries = state.history.get_or_insert_mut(url.to_string(), VecDeque::new);
        entries.push_back(entry);
        while entries.len() > max_history {
            entries.pop_front();
        }
    }

    fn history(&self, url: &str) -> Vec<CacheEntry> {
        let mut state = self.lock();
        let mut entries: Vec<CacheEntry> = state
            .history
            .get(url)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }
}
