//! HTTP response cache middleware
//!
//! Read-through caching of GET responses keyed by request shape. A hit is
//! served straight from the cache with `X-Cache: HIT` and the handler never
//! runs; a miss runs the handler and, for 2xx responses, writes the payload
//! back fire-and-forget so the response path is never delayed by the cache.
//! Cache failures degrade to "as if no cache existed".
//!
//! Attach with `axum::middleware::from_fn_with_state`:
//!
//! ```ignore
//! let cache = ResponseCache::new(registry.manager(Domain::Machines).clone())
//!     .with_ttl(60);
//! let app = Router::new()
//!     .route("/machines", get(list_machines))
//!     .layer(middleware::from_fn_with_state(cache, response_cache));
//! ```

use crate::cache::manager::CacheManager;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response header signaling cache hit or miss
pub const CACHE_HEADER: &str = "x-cache";

type KeyFn = Arc<dyn Fn(&Request) -> String + Send + Sync>;
type Predicate = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Payload stored for a cached response
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Middleware configuration: key generator, TTL, target manager, and an
/// optional eligibility predicate
#[derive(Clone)]
pub struct ResponseCache {
    manager: CacheManager,
    ttl: Option<u64>,
    key_fn: KeyFn,
    predicate: Predicate,
}

impl ResponseCache {
    /// Cache responses through `manager` with the default key (method +
    /// path), the manager's default TTL, and no eligibility restriction
    pub fn new(manager: CacheManager) -> Self {
        Self {
            manager,
            ttl: None,
            key_fn: Arc::new(|req| format!("{}:{}", req.method(), req.uri().path())),
            predicate: Arc::new(|_| true),
        }
    }

    /// Override the TTL in seconds for cached responses
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl = Some(ttl_secs);
        self
    }

    /// Override how the cache key is derived from the request
    pub fn with_key_fn(mut self, key_fn: impl Fn(&Request) -> String + Send + Sync + 'static) -> Self {
        self.key_fn = Arc::new(key_fn);
        self
    }

    /// Restrict caching to requests accepted by `predicate`
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&Request) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Arc::new(predicate);
        self
    }
}

/// The middleware function itself, for `from_fn_with_state`
pub async fn response_cache(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    // Only idempotent reads are ever cached
    if request.method() != Method::GET || !(cache.predicate)(&request) {
        return next.run(request).await;
    }

    let key = (cache.key_fn)(&request);

    if let Some(cached) = cache.manager.get::<CachedResponse>(&key).await {
        return serve_cached(cached);
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("[CACHE] Failed to buffer response body for {}: {}", key, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let payload = CachedResponse {
        status: parts.status.as_u16(),
        content_type: parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: bytes.to_vec(),
    };

    // Write-back never delays the response path
    let manager = cache.manager.clone();
    let ttl = cache.ttl;
    let write_key = key.clone();
    tokio::spawn(async move {
        manager.set(&write_key, &payload, ttl).await;
    });

    parts
        .headers
        .insert(CACHE_HEADER, HeaderValue::from_static("MISS"));
    Response::from_parts(parts, Body::from(bytes))
}

fn serve_cached(cached: CachedResponse) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK))
        .header(CACHE_HEADER, HeaderValue::from_static("HIT"));
    if let Some(content_type) = &cached.content_type {
        builder = builder.header(CONTENT_TYPE, content_type.as_str());
    }
    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|e| {
            tracing::warn!("[CACHE] Failed to rebuild cached response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryBackend;
    use std::sync::Arc;

    fn manager() -> CacheManager {
        CacheManager::new("vendhub:http:", 0, Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn default_key_is_method_and_path() {
        let cache = ResponseCache::new(manager());
        let request = Request::builder()
            .method(Method::GET)
            .uri("/machines?page=2")
            .body(Body::empty())
            .unwrap();
        assert_eq!((cache.key_fn)(&request), "GET:/machines");
    }

    #[test]
    fn custom_key_fn_sees_the_full_request() {
        let cache = ResponseCache::new(manager())
            .with_key_fn(|req| format!("{}", req.uri()));
        let request = Request::builder()
            .uri("/machines?page=2")
            .body(Body::empty())
            .unwrap();
        assert_eq!((cache.key_fn)(&request), "/machines?page=2");
    }
}
