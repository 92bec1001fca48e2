//! Lock ownership tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use booking_core::error::{AppError, ErrorKind};

/// Proof of exclusive, time-bounded ownership of a resource key.
///
/// Produced by a successful acquire and consumed by the matching release.
/// The compact string form (`{"resourceKey":..,"lockValue":..}`) lets a
/// token be handed from one workflow step to another, or across processes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockToken {
    /// Resource key the lock was taken on, without the backend prefix.
    pub resource_key: String,
    /// Opaque value stored under the key; only its holder knows it.
    pub lock_value: String,
}

impl LockToken {
    /// Create a token from its parts.
    pub fn new(resource_key: impl Into<String>, lock_value: impl Into<String>) -> Self {
        Self {
            resource_key: resource_key.into(),
            lock_value: lock_value.into(),
        }
    }

    /// Serialize to the compact string form.
    pub fn to_compact(&self) -> String {
        self.to_string()
    }

    /// Parse the compact string form.
    pub fn parse(serialized: &str) -> Result<Self, AppError> {
        serialized.parse()
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for LockToken {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AppError::token_format("Serialized token cannot be empty"));
        }

        let token: LockToken = serde_json::from_str(s).map_err(|e| {
            AppError::with_source(
                ErrorKind::TokenFormat,
                "Invalid serialized token format",
                e,
            )
        })?;

        if token.resource_key.is_empty() || token.lock_value.is_empty() {
            return Err(AppError::token_format(
                "Serialized token has an empty resource key or lock value",
            ));
        }

        Ok(token)
    }
}
