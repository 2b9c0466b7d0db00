//! In-process cache emulation
//!
//! Stands in for Redis when no server is reachable (local development,
//! offline operation, tests). Reproduces only the command subset the rest
//! of the layer calls.
//!
//! Expiry is lazy: every read-side operation first evicts the key if its
//! expiry instant has passed, so an expired entry behaves as absent without
//! a background sweep. Keys that are set and never read again are not
//! reclaimed — accepted for a development fallback, not a production store.

use crate::cache::backend::CacheBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Default)]
struct Store {
    values: HashMap<String, Vec<u8>>,
    expirations: HashMap<String, Instant>,
}

impl Store {
    /// Evict `key` if its expiry instant has passed; returns true if evicted
    fn evict_if_expired(&mut self, key: &str) -> bool {
        match self.expirations.get(key) {
            Some(expiry) if *expiry <= Instant::now() => {
                self.values.remove(key);
                self.expirations.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Whether `key` holds a live, unexpired value
    fn live(&mut self, key: &str) -> bool {
        self.evict_if_expired(key);
        self.values.contains_key(key)
    }
}

/// In-memory key-value store with per-key expiry
pub struct MemoryBackend {
    inner: Mutex<Store>,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Store::default()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Anchored glob match over the full key, `*` matching any character run
fn glob_match(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];

    if !key.starts_with(first) {
        return false;
    }
    let mut rest = &key[first.len()..];

    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(idx) => rest = &rest[idx + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.inner.lock().await;
        store.evict_if_expired(key);
        Ok(store.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<()> {
        let mut store = self.inner.lock().await;
        store.values.insert(key.to_string(), value);
        match ttl {
            // A zero TTL stores an already-expired entry; the first read
            // evicts it, which keeps the behavior deterministic.
            Some(secs) => {
                store
                    .expirations
                    .insert(key.to_string(), Instant::now() + Duration::from_secs(secs));
            }
            // An overwrite without TTL clears any previous expiry, matching
            // the SET command.
            None => {
                store.expirations.remove(key);
            }
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let mut store = self.inner.lock().await;
        let mut removed = 0;
        for key in keys {
            store.evict_if_expired(key);
            if store.values.remove(key).is_some() {
                store.expirations.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut store = self.inner.lock().await;
        Ok(store.live(key))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let mut store = self.inner.lock().await;
        if !store.live(key) {
            return Ok(false);
        }
        store
            .expirations
            .insert(key.to_string(), Instant::now() + Duration::from_secs(ttl_secs));
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut store = self.inner.lock().await;
        if !store.live(key) {
            return Ok(-2);
        }
        match store.expirations.get(key) {
            Some(expiry) => Ok(expiry.saturating_duration_since(Instant::now()).as_secs() as i64),
            None => Ok(-1),
        }
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let mut store = self.inner.lock().await;

        let expired: Vec<String> = store
            .expirations
            .iter()
            .filter(|(_, expiry)| **expiry <= Instant::now())
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            store.values.remove(&key);
            store.expirations.remove(&key);
        }

        Ok(store
            .values
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect())
    }

    async fn flush_all(&self) -> Result<()> {
        let mut store = self.inner.lock().await;
        store.values.clear();
        store.expirations.clear();
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
