//! Redis lock backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Script};

use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;
use booking_core::traits::LockBackend;

use super::client::RedisClient;

/// Lua script for atomic compare-and-delete.
///
/// KEYS[1] = lock key
/// ARGV[1] = expected owner value
///
/// Returns the number of deleted keys (1 on match, 0 otherwise).
const RELEASE_SCRIPT: &str = r#"
    if redis.call('GET', KEYS[1]) == ARGV[1] then
        return redis.call('DEL', KEYS[1])
    else
        return 0
    end
"#;

/// Redis-backed lock store for multi-process deployments.
#[derive(Debug, Clone)]
pub struct RedisLockBackend {
    /// Redis client.
    client: RedisClient,
}

impl RedisLockBackend {
    /// Create a new Redis lock backend.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::LockBackend, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl LockBackend for RedisLockBackend {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        // SET key value PX ttl NX
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(deleted > 0)
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let deleted: i64 = conn.del(key).await.map_err(Self::map_err)?;
        Ok(deleted > 0)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.conn_mut();
        let value: Option<String> = conn.get(key).await.map_err(Self::map_err)?;
        Ok(value)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
