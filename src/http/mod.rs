//! HTTP integration
//!
//! Axum middleware exposing the cache layer to route handlers.

pub mod response_cache;

pub use response_cache::{response_cache, ResponseCache, CACHE_HEADER};
