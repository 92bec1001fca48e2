//! Lock backend manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use booking_core::config::lock::LockConfig;
use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::traits::LockBackend;

/// Lock backend manager that wraps the configured backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct LockBackendManager {
    /// The inner backend.
    inner: Arc<dyn LockBackend>,
}

impl LockBackendManager {
    /// Create a new manager from configuration.
    pub async fn new(config: &LockConfig) -> AppResult<Self> {
        let inner: Arc<dyn LockBackend> = match config.backend.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis lock backend");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisLockBackend::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory lock backend");
                Arc::new(crate::memory::MemoryLockBackend::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown lock backend: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl LockBackend for LockBackendManager {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        self.inner.compare_and_delete(key, expected).await
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        self.inner.delete(key).await
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::error::ErrorKind;

    #[tokio::test]
    async fn test_memory_backend_selected_by_default() {
        let manager = LockBackendManager::new(&LockConfig::default()).await.unwrap();
        assert!(manager.health_check().await.unwrap());
        assert!(manager.set_nx("k", "v", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_a_configuration_error() {
        let config = LockConfig {
            backend: "etcd".to_string(),
            ..LockConfig::default()
        };
        let err = LockBackendManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
