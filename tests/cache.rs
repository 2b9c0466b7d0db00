//! Cache layer integration tests
//!
//! Exercises the manager over the in-process emulation end to end: expiry
//! boundaries, namespace isolation, read-through, invalidation after a
//! write, and fail-open behavior under a dead backing store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vendhub_cache::cache::backend::CacheBackend;
use vendhub_cache::cache::memory::MemoryBackend;
use vendhub_cache::cache::{CacheManager, CacheRegistry, Domain};
use vendhub_cache::config::CacheConfig;
use vendhub_cache::error::{Error, Result};

fn manager(prefix: &str) -> CacheManager {
    CacheManager::new(prefix, 0, Arc::new(MemoryBackend::new()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Machine {
    id: u32,
    serial: String,
    ingredients: Vec<String>,
}

#[tokio::test]
async fn json_round_trip_is_deep_equal() {
    let mgr = manager("vendhub:machines:");
    let machine = Machine {
        id: 7,
        serial: "VH-2041-X".to_string(),
        ingredients: vec!["beans".to_string(), "milk".to_string()],
    };

    assert!(mgr.set("machine:7", &machine, None).await);
    assert_eq!(mgr.get::<Machine>("machine:7").await, Some(machine));
}

#[tokio::test]
async fn entry_expires_at_the_ttl_boundary() {
    let mgr = manager("vendhub:machines:");

    assert!(mgr.set("a", &"x", Some(1)).await);
    assert_eq!(mgr.get::<String>("a").await, Some("x".to_string()));
    assert!(mgr.exists("a").await);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(mgr.get::<String>("a").await, None);
    assert!(!mgr.exists("a").await);
}

#[tokio::test]
async fn flush_never_crosses_namespaces() {
    let registry = CacheRegistry::new(&CacheConfig::default(), Arc::new(MemoryBackend::new()));
    let machines = registry.manager(Domain::Machines);
    let inventory = registry.manager(Domain::Inventory);

    machines.set("list", &vec!["vm-1"], None).await;
    inventory.set("list", &vec!["beans"], None).await;

    assert!(machines.flush().await);

    assert_eq!(machines.get::<Vec<String>>("list").await, None);
    assert_eq!(
        inventory.get::<Vec<String>>("list").await,
        Some(vec!["beans".to_string()])
    );
}

#[tokio::test]
async fn write_invalidation_recomputes_the_list() {
    let mgr = manager("vendhub:machines:");

    // cached list before the create
    let before: Vec<u32> = mgr
        .cache("machines:list", Some(600), || async { Ok(vec![1, 2]) })
        .await
        .unwrap();
    assert_eq!(before, vec![1, 2]);

    // a create on Machine must clear every query shape for the type
    assert!(mgr.invalidate(&["machines:*"]).await);

    let after: Vec<u32> = mgr
        .cache("machines:list", Some(600), || async { Ok(vec![1, 2, 3]) })
        .await
        .unwrap();
    assert_eq!(after, vec![1, 2, 3]);
}

/// Backing store that errors on every operation
struct FailingBackend;

#[async_trait]
impl CacheBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::cache("backend down"))
    }
    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<u64>) -> Result<()> {
        Err(Error::cache("backend down"))
    }
    async fn delete(&self, _keys: &[String]) -> Result<u64> {
        Err(Error::cache("backend down"))
    }
    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(Error::cache("backend down"))
    }
    async fn expire(&self, _key: &str, _ttl_secs: u64) -> Result<bool> {
        Err(Error::cache("backend down"))
    }
    async fn ttl(&self, _key: &str) -> Result<i64> {
        Err(Error::cache("backend down"))
    }
    async fn keys_matching(&self, _pattern: &str) -> Result<Vec<String>> {
        Err(Error::cache("backend down"))
    }
    async fn flush_all(&self) -> Result<()> {
        Err(Error::cache("backend down"))
    }
    fn backend_type(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn every_operation_fails_open_when_the_store_is_down() {
    let mgr = CacheManager::new("vendhub:auth:", 60, Arc::new(FailingBackend));

    assert_eq!(mgr.get::<String>("k").await, None);
    assert!(!mgr.set("k", &"v", None).await);
    assert!(!mgr.delete("k").await);
    assert!(!mgr.delete_pattern("*").await);
    assert!(!mgr.exists("k").await);
    assert!(!mgr.expire("k", 60).await);
    assert_eq!(mgr.ttl("k").await, -2);
    assert!(!mgr.flush().await);
    assert!(!mgr.invalidate(&["a:*", "b:*"]).await);

    // read-through still produces the value, it just isn't stored
    let value: u32 = mgr.cache("k", None, || async { Ok(9) }).await.unwrap();
    assert_eq!(value, 9);
}

#[tokio::test]
async fn expire_extends_a_live_entry() {
    let mgr = manager("vendhub:auth:");
    mgr.set("session:1", &"token", Some(1)).await;

    assert!(mgr.expire("session:1", 60).await);
    let remaining = mgr.ttl("session:1").await;
    assert!(remaining > 1 && remaining <= 60);
}
