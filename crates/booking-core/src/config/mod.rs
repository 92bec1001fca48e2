//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so an empty
//! configuration is valid.

pub mod lock;
pub mod logging;
pub mod workflow;

use serde::{Deserialize, Serialize};

use self::lock::LockConfig;
use self::logging::LoggingConfig;
use self::workflow::WorkflowConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Distributed lock settings.
    #[serde(default)]
    pub lock: LockConfig,
    /// Command pipeline settings.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BOOKING__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from TOML files located in `dir`.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOOKING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from("does/not/exist", "test").unwrap();
        assert_eq!(config.lock.backend, "memory");
        assert_eq!(config.lock.key_prefix, "lock:");
        assert_eq!(config.lock.session.ttl_ms, 5000);
        assert_eq!(config.lock.session.max_attempts, 5);
        assert_eq!(config.workflow.append_retries, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "lock": { "backend": "redis", "session": { "ttl_ms": 2000 } }
        }))
        .unwrap();
        assert_eq!(config.lock.backend, "redis");
        assert_eq!(config.lock.session.ttl_ms, 2000);
        assert_eq!(config.lock.session.initial_backoff_ms, 100);
        assert_eq!(config.lock.redis.url, "redis://localhost:6379");
    }
}
