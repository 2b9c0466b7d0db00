//! Method memoization wrapper
//!
//! Wraps an async function so repeated calls within a TTL window return the
//! cached result instead of re-executing the body. The key is produced by a
//! [`KeyStrategy`]; the manager is resolved up front, either directly or by
//! service name through the registry.

use crate::cache::manager::CacheManager;
use crate::cache::registry::CacheRegistry;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// How the cache key is derived for a wrapped function
#[derive(Clone)]
pub enum KeyStrategy<A> {
    /// Same key for every invocation
    Fixed(String),
    /// Key computed from the call arguments
    FromArgs(Arc<dyn Fn(&A) -> String + Send + Sync>),
}

impl<A> KeyStrategy<A> {
    /// Key derived from the provided arguments
    pub fn from_args(f: impl Fn(&A) -> String + Send + Sync + 'static) -> Self {
        Self::FromArgs(Arc::new(f))
    }

    fn resolve(&self, args: &A) -> String {
        match self {
            KeyStrategy::Fixed(key) => key.clone(),
            KeyStrategy::FromArgs(f) => f(args),
        }
    }
}

/// An async function memoized through a cache manager
#[derive(Clone)]
pub struct Memoized<F, A> {
    manager: CacheManager,
    key: KeyStrategy<A>,
    ttl: Option<u64>,
    inner: F,
}

impl<F, A, Fut, T> Memoized<F, A>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T>>,
    T: Serialize + DeserializeOwned,
{
    /// Wrap `inner` so its result is cached under keys from `key` with `ttl`
    /// seconds (None uses the manager default)
    pub fn new(manager: CacheManager, key: KeyStrategy<A>, ttl: Option<u64>, inner: F) -> Self {
        Self {
            manager,
            key,
            ttl,
            inner,
        }
    }

    /// Wrap `inner`, resolving the manager from `service` through the
    /// registry (unknown services fall back to the generic manager)
    pub fn for_service(
        registry: &CacheRegistry,
        service: &str,
        key: KeyStrategy<A>,
        ttl: Option<u64>,
        inner: F,
    ) -> Self {
        Self::new(registry.for_service(service), key, ttl, inner)
    }

    /// Invoke the wrapped function through the cache
    pub async fn call(&self, args: A) -> Result<T> {
        let key = self.key.resolve(&args);
        self.manager
            .cache(&key, self.ttl, || (self.inner)(args))
            .await
    }
}
