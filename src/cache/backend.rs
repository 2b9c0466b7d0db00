//! Cache backend abstraction
//!
//! The backing store behind every [`CacheManager`](super::CacheManager) is a
//! strategy object selected once at startup: Redis when configured and
//! reachable, otherwise the in-process emulation. All managers in a process
//! share the same handle; the choice is never re-evaluated per call.

use crate::cache::memory::MemoryBackend;
use crate::cache::redis::RedisBackend;
use crate::config::CacheConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to the process-wide backing store
pub type SharedBackend = Arc<dyn CacheBackend>;

/// Minimal key-value command surface the cache layer relies on
///
/// Both implementations expose Redis semantics:
/// - `set` with `ttl: Some(0)` behaves as an immediately expired entry
/// - `ttl` returns `-1` for a key without expiry and `-2` for a missing key
/// - `keys_matching` is an anchored glob over full keys, `*` matching any
///   sequence of characters
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, with an expiry of `ttl` seconds when given
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<()>;

    /// Delete the given keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Whether `key` currently holds a live value
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set the expiry of an existing key; returns false for a missing key
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// Remaining lifetime of `key` in seconds (`-1` no expiry, `-2` missing)
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// All live keys matching the anchored glob `pattern`
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>>;

    /// Drop every key in the store
    async fn flush_all(&self) -> Result<()>;

    /// Short identifier for logging ("redis" or "memory")
    fn backend_type(&self) -> &'static str;
}

/// Select and construct the process-wide backing store
///
/// Redis is used when a URL is configured and the server answers PING;
/// otherwise the in-process emulation takes over with a warning, so the
/// application keeps running with per-process caching only. When caching is
/// disabled the emulation is returned as well — call sites stay uniform and
/// nothing leaves the process.
pub async fn connect(config: &CacheConfig) -> SharedBackend {
    if !config.enabled {
        tracing::info!("[CACHE] Caching disabled, using in-process store");
        return Arc::new(MemoryBackend::new());
    }

    if let Some(url) = config.redis_url.as_deref().filter(|u| !u.is_empty()) {
        match RedisBackend::connect(url).await {
            Ok(backend) => {
                tracing::info!("[CACHE] Redis connection established (remote mode)");
                return Arc::new(backend);
            }
            Err(e) => {
                tracing::warn!(
                    "[CACHE] Redis unreachable, falling back to in-process emulation: {}",
                    e
                );
            }
        }
    } else {
        tracing::info!("[CACHE] Redis not configured, using in-process emulation (local mode)");
    }

    Arc::new(MemoryBackend::new())
}
