//! Caching and domain data-access layer for the VendHub fleet backend
//!
//! The backend's route handlers, Telegram bot, and import jobs all read and
//! write cached values through one uniform interface while staying agnostic
//! to whether a real Redis server is reachable. When it is not, an
//! in-process emulation takes over transparently.
//!
//! # Components
//!
//! - [`cache`]: backend selection, the namespaced [`CacheManager`], the
//!   per-domain [`CacheRegistry`], and function memoization
//! - [`http`]: axum middleware caching GET responses with an
//!   `X-Cache: HIT/MISS` header
//! - [`db`]: lazily-constructed per-domain `sqlx` clients with
//!   read-through/write-invalidate query caching for allow-listed entity
//!   types
//! - [`config`], [`logging`], [`error`]: ambient plumbing
//!
//! # Startup
//!
//! ```ignore
//! let config = ConfigLoader::new().load()?;
//! logging::init_logging(&config.logging)?;
//!
//! let backend = cache::connect(&config.cache).await;
//! let registry = Arc::new(CacheRegistry::new(&config.cache, backend));
//!
//! let query_caching = config.cache.redis_url.is_some();
//! let sources = DataSources::new(
//!     config.data_sources,
//!     query_caching.then(|| registry.clone()),
//! );
//! ```
//!
//! All cached data is a derived, recomputable artifact — never the system
//! of record. The cache fails open: a dead Redis costs latency, not
//! correctness.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod logging;

pub use cache::{CacheManager, CacheRegistry, Domain};
pub use config::{AppConfig, CacheConfig, ConfigLoader, DataSourcesConfig, LoggingConfig};
pub use db::{DataDomain, DataSources, DomainClient, QueryCache};
pub use error::{Error, Result};
pub use http::{response_cache, ResponseCache, CACHE_HEADER};
