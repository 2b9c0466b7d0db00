//! Caching layer
//!
//! A namespaced façade over either a real Redis server or an in-process
//! emulation, selected once at startup. Application code reads and writes
//! through [`CacheManager`] and never learns which backing store answered.
//!
//! # Architecture
//!
//! - [`backend`]: the [`CacheBackend`](backend::CacheBackend) strategy trait
//!   and the one-shot selection between Redis and the emulation
//! - [`memory`]: the in-process emulation with lazy per-key expiry
//! - [`redis`]: the network-backed store
//! - [`manager`]: the namespaced, fail-open public API
//! - [`registry`]: one manager per business domain
//! - [`memoize`]: function-level read-through caching

pub mod backend;
pub mod manager;
pub mod memoize;
pub mod memory;
pub mod redis;
pub mod registry;

pub use backend::{connect, CacheBackend, SharedBackend};
pub use manager::CacheManager;
pub use memoize::{KeyStrategy, Memoized};
pub use memory::MemoryBackend;
pub use redis::RedisBackend;
pub use registry::{CacheRegistry, Domain};
