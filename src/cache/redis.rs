//! Redis cache backend
//!
//! Network-backed implementation of [`CacheBackend`] for deployments with a
//! reachable Redis server. Connections are multiplexed; construction is
//! verified with a PING so an unreachable server is detected at startup
//! rather than on the first cache call.

use crate::cache::backend::CacheBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::time::Duration;
use tokio::time::timeout;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed cache store
pub struct RedisBackend {
    client: Client,
}

impl RedisBackend {
    /// Open a client for `url` and verify the server answers PING
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::cache(format!("failed to create redis client: {e}")))?;

        let mut conn =
            match timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection()).await {
                Ok(Ok(conn)) => conn,
                Ok(Err(e)) => {
                    return Err(Error::cache(format!(
                        "failed to connect to redis at {url}: {e}"
                    )))
                }
                Err(_) => return Err(Error::cache("redis connection timed out")),
            };

        match timeout(
            CONNECT_TIMEOUT,
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        {
            Ok(Ok(pong)) if pong == "PONG" => Ok(Self { client }),
            Ok(Ok(other)) => Err(Error::cache(format!(
                "redis ping returned unexpected reply: {other}"
            ))),
            Ok(Err(e)) => Err(Error::cache(format!("redis ping failed: {e}"))),
            Err(_) => Err(Error::cache("redis ping timed out")),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::cache(format!("failed to acquire redis connection: {e}")))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<()> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(secs) if secs > 0 => {
                redis::cmd("SETEX")
                    .arg(key)
                    .arg(secs)
                    .arg(value)
                    .query_async::<()>(&mut conn)
                    .await?;
            }
            // SETEX rejects a zero TTL; an already-expired entry is
            // indistinguishable from an absent one, so delete instead.
            Some(_) => {
                redis::cmd("DEL").arg(key).query_async::<()>(&mut conn).await?;
            }
            None => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .query_async::<()>(&mut conn)
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let removed: u64 = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(exists)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let mut conn = self.connection().await?;
        let applied: bool = redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(applied)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        let remaining: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
        Ok(remaining)
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await?;
        Ok(keys)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "redis"
    }
}
