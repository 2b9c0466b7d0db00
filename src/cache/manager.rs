//! Namespaced cache manager
//!
//! `CacheManager` is the façade business code talks to. Every key is
//! prefixed with the manager's namespace, so two managers with different
//! prefixes can never observe or invalidate each other's entries — pattern
//! deletion included. Values are stored as JSON.
//!
//! The cache is always allowed to fail open: backing-store and
//! (de)serialization failures are logged and converted to the documented
//! miss/false defaults, never propagated to the caller.

use crate::cache::backend::SharedBackend;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Namespaced façade over the shared backing store
#[derive(Clone)]
pub struct CacheManager {
    prefix: String,
    default_ttl: u64,
    backend: SharedBackend,
}

impl CacheManager {
    /// Create a manager writing under `prefix` with `default_ttl` seconds
    /// (0 meaning "no expiry") for call sites that omit a TTL
    pub fn new(prefix: impl Into<String>, default_ttl: u64, backend: SharedBackend) -> Self {
        Self {
            prefix: prefix.into(),
            default_ttl,
            backend,
        }
    }

    /// The key prefix this manager owns
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Default TTL in seconds applied when a call site omits one
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn effective_ttl(&self, ttl: Option<u64>) -> Option<u64> {
        let secs = ttl.unwrap_or(self.default_ttl);
        (secs > 0).then_some(secs)
    }

    /// Get a value, or None on miss, backend failure, or a value that no
    /// longer deserializes
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        match self.backend.get(&full_key).await {
            Ok(Some(raw)) => match serde_json::from_slice(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("[CACHE] Failed to deserialize {}: {}", full_key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[CACHE] Get failed for {}: {}", full_key, e);
                None
            }
        }
    }

    /// Store a value; `ttl` of None uses the manager default, 0 stores
    /// without expiry. Returns false instead of erroring.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool {
        let full_key = self.full_key(key);
        let raw = match serde_json::to_vec(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("[CACHE] Failed to serialize {}: {}", full_key, e);
                return false;
            }
        };
        match self.backend.set(&full_key, raw, self.effective_ttl(ttl)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[CACHE] Set failed for {}: {}", full_key, e);
                false
            }
        }
    }

    /// Delete a single key
    pub async fn delete(&self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.backend.delete(std::slice::from_ref(&full_key)).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("[CACHE] Delete failed for {}: {}", full_key, e);
                false
            }
        }
    }

    /// Delete every key under this manager's prefix matching `pattern`
    ///
    /// The pattern is automatically prefixed, so it can never reach into
    /// another manager's namespace. Zero matches is a trivial success.
    pub async fn delete_pattern(&self, pattern: &str) -> bool {
        let full_pattern = self.full_key(pattern);
        let keys = match self.backend.keys_matching(&full_pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("[CACHE] Key scan failed for {}: {}", full_pattern, e);
                return false;
            }
        };
        if keys.is_empty() {
            return true;
        }
        match self.backend.delete(&keys).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("[CACHE] Pattern delete failed for {}: {}", full_pattern, e);
                false
            }
        }
    }

    /// Whether `key` currently holds a live value
    pub async fn exists(&self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.backend.exists(&full_key).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("[CACHE] Exists failed for {}: {}", full_key, e);
                false
            }
        }
    }

    /// Reset the expiry of an existing key
    pub async fn expire(&self, key: &str, ttl_secs: u64) -> bool {
        let full_key = self.full_key(key);
        match self.backend.expire(&full_key, ttl_secs).await {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!("[CACHE] Expire failed for {}: {}", full_key, e);
                false
            }
        }
    }

    /// Remaining lifetime in seconds (`-1` no expiry, `-2` missing or error)
    pub async fn ttl(&self, key: &str) -> i64 {
        let full_key = self.full_key(key);
        match self.backend.ttl(&full_key).await {
            Ok(remaining) => remaining,
            Err(e) => {
                tracing::warn!("[CACHE] TTL failed for {}: {}", full_key, e);
                -2
            }
        }
    }

    /// Delete every key under this manager's prefix
    pub async fn flush(&self) -> bool {
        self.delete_pattern("*").await
    }

    /// Read-through helper: return the cached value, or invoke `producer`,
    /// store its result under `key`, and return it
    ///
    /// `producer` runs at most once per call. Concurrent overlapping calls
    /// for the same key are not deduplicated; each miss invokes its own
    /// producer. Producer errors propagate — only cache failures are
    /// swallowed.
    pub async fn cache<T, F, Fut>(&self, key: &str, ttl: Option<u64>, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }
        let value = producer().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    /// Invalidate several related patterns in one call, typically after a
    /// domain write
    pub async fn invalidate(&self, patterns: &[&str]) -> bool {
        let mut all_ok = true;
        for pattern in patterns {
            all_ok &= self.delete_pattern(pattern).await;
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryBackend;
    use std::sync::Arc;

    fn manager(prefix: &str) -> CacheManager {
        CacheManager::new(prefix, 0, Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn get_returns_none_for_corrupt_payload() {
        let backend = Arc::new(MemoryBackend::new());
        let mgr = CacheManager::new("t:", 0, backend.clone());
        use crate::cache::backend::CacheBackend;
        backend
            .set("t:bad", b"not json".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(mgr.get::<u32>("bad").await, None);
    }

    #[tokio::test]
    async fn set_uses_default_ttl_when_omitted() {
        let backend = Arc::new(MemoryBackend::new());
        let mgr = CacheManager::new("t:", 120, backend);
        assert!(mgr.set("k", &1u32, None).await);
        let remaining = mgr.ttl("k").await;
        assert!(remaining > 0 && remaining <= 120);
    }

    #[tokio::test]
    async fn zero_default_ttl_means_no_expiry() {
        let mgr = manager("t:");
        assert!(mgr.set("k", &1u32, None).await);
        assert_eq!(mgr.ttl("k").await, -1);
    }

    #[tokio::test]
    async fn delete_pattern_stays_inside_prefix() {
        let backend = Arc::new(MemoryBackend::new());
        let machines = CacheManager::new("vendhub:machines:", 0, backend.clone());
        let auth = CacheManager::new("vendhub:auth:", 0, backend);

        machines.set("list", &vec![1, 2], None).await;
        auth.set("list", &vec![3], None).await;

        assert!(machines.delete_pattern("*").await);
        assert_eq!(machines.get::<Vec<i32>>("list").await, None);
        assert_eq!(auth.get::<Vec<i32>>("list").await, Some(vec![3]));
    }

    #[tokio::test]
    async fn cache_invokes_producer_once_per_miss() {
        let mgr = manager("t:");
        let mut calls = 0u32;

        let first = mgr
            .cache("answer", Some(60), || {
                calls += 1;
                async { Ok(42u32) }
            })
            .await
            .unwrap();
        assert_eq!(first, 42);

        let second = mgr
            .cache("answer", Some(60), || {
                calls += 1;
                async { Ok(0u32) }
            })
            .await
            .unwrap();
        assert_eq!(second, 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn cache_propagates_producer_errors() {
        let mgr = manager("t:");
        let result = mgr
            .cache::<u32, _, _>("k", None, || async {
                Err(crate::error::Error::cache("db down"))
            })
            .await;
        assert!(result.is_err());
        // a failed producer must not leave a cached entry behind
        assert_eq!(mgr.get::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn invalidate_clears_all_listed_patterns() {
        let mgr = manager("vendhub:machines:");
        mgr.set("Machine:list", &1u32, None).await;
        mgr.set("Machine:42", &2u32, None).await;
        mgr.set("Location:list", &3u32, None).await;

        assert!(mgr.invalidate(&["Machine:*"]).await);
        assert_eq!(mgr.get::<u32>("Machine:list").await, None);
        assert_eq!(mgr.get::<u32>("Machine:42").await, None);
        assert_eq!(mgr.get::<u32>("Location:list").await, Some(3));
    }

    #[tokio::test]
    async fn delete_pattern_with_no_matches_succeeds() {
        let mgr = manager("t:");
        assert!(mgr.delete_pattern("nothing:*").await);
    }
}
