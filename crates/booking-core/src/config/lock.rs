//! Distributed lock configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Lock backend type: `"memory"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Prefix prepended to every lock key in the backend.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisLockConfig,
    /// Policy for the per-session lock taken when cancelling a reservation.
    #[serde(default)]
    pub session: SessionLockConfig,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            key_prefix: default_key_prefix(),
            redis: RedisLockConfig::default(),
            session: SessionLockConfig::default(),
        }
    }
}

/// Redis lock backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisLockConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisLockConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

/// TTL and backoff schedule for the session lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLockConfig {
    /// Lock time-to-live in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// Total acquisition attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for any single backoff delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl SessionLockConfig {
    /// Lock TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Initial backoff as a [`Duration`].
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Maximum backoff as a [`Duration`].
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for SessionLockConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_key_prefix() -> String {
    "lock:".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_ttl_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    1000
}
