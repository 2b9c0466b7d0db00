//! Query-result cache binding
//!
//! Attaches read-through/write-invalidate caching to an explicit allow-list
//! of entity types, each with its own TTL. Entity types not listed bypass
//! the cache unconditionally: read-heavy reference data gets long TTLs,
//! write-heavy operational data is excluded to avoid staleness.

use crate::cache::manager::CacheManager;
use crate::db::DataDomain;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;

/// Per-entity-type cache over a domain's cache manager
#[derive(Clone)]
pub struct QueryCache {
    manager: CacheManager,
    ttls: HashMap<String, u64>,
}

impl QueryCache {
    /// Bind `manager` to the given entity-type → TTL-seconds allow-list
    pub fn new(
        manager: CacheManager,
        bindings: impl IntoIterator<Item = (&'static str, u64)>,
    ) -> Self {
        Self {
            manager,
            ttls: bindings
                .into_iter()
                .map(|(entity, ttl)| (entity.to_string(), ttl))
                .collect(),
        }
    }

    /// Bind `manager` to the stock allow-list for `domain`
    pub fn for_domain(manager: CacheManager, domain: DataDomain) -> Self {
        Self::new(manager, Self::default_bindings(domain).iter().copied())
    }

    /// Stock allow-list per domain: reference data cached long, operational
    /// data short or not at all (stock levels and tasks are never cached)
    pub fn default_bindings(domain: DataDomain) -> &'static [(&'static str, u64)] {
        match domain {
            DataDomain::Auth => &[("Role", 3600), ("Permission", 3600)],
            DataDomain::Machines => &[
                ("Machine", 600),
                ("MachineModel", 3600),
                ("Location", 1800),
            ],
            DataDomain::Inventory => &[("Ingredient", 1800), ("Product", 1800)],
            DataDomain::Tasks => &[("TaskType", 3600)],
            DataDomain::Shared => &[("Setting", 7200), ("City", 86400)],
        }
    }

    /// TTL for `entity`, or None when the type bypasses the cache
    pub fn ttl_for(&self, entity: &str) -> Option<u64> {
        self.ttls.get(entity).copied()
    }

    /// Before-query hook: serve `entity`/`key` from the cache, or run
    /// `producer` and store its result under the entity's TTL. Unlisted
    /// entity types go straight to the producer.
    pub async fn fetch<T, F, Fut>(&self, entity: &str, key: &str, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.ttl_for(entity) {
            Some(ttl) => {
                self.manager
                    .cache(&format!("{entity}:{key}"), Some(ttl), producer)
                    .await
            }
            None => producer().await,
        }
    }

    /// After-write hook: drop every cached result that could contain stale
    /// rows of `entity`
    pub async fn invalidate_entity(&self, entity: &str) -> bool {
        if self.ttl_for(entity).is_none() {
            return true;
        }
        self.manager.invalidate(&[&format!("{entity}:*")]).await
    }
}
