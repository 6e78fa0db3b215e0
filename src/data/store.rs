use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub stored_at: Instant,
}

/// TTL cache shared by clones of the same client. Expired entries are
/// dropped lazily, on the next lookup through this instance.
#[derive(Clone, Debug)]
pub struct SignalStore<T> {
    entries: Arc<DashMap<String, CacheEntry<T>>>,
    pub ttl: Duration,
}

#[derive(Serialize)]
struct QueryKey<'a> {
    query: &'a str,
    max_results: usize,
}

impl<T: Clone> SignalStore<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Canonical key for a search; identical parameters always map to the same key.
    pub fn key_for(query: &str, max_results: usize) -> String {
        serde_json::to_string(&QueryKey { query, max_results })
            .unwrap_or_else(|_| format!("{}|{}", query, max_results))
    }

    fn is_fresh(&self, entry: &CacheEntry<T>, now: Instant) -> bool {
        now.duration_since(entry.stored_at) < self.ttl
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
    }

    /// Fresh payload for `key`, after collecting expired entries.
    pub fn get(&self, key: &str) -> Option<T> {
        self.purge_expired();
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.payload.clone())
    }

    pub fn insert(&self, key: String, payload: T) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
