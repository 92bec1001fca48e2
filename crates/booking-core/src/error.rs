//! Unified application error types for conference booking.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The session or the user's membership in it does not exist.
    NotFound,
    /// Duplicate membership, or the session lock stayed busy after all retries.
    Conflict,
    /// A user was found both reserved and waitlisted. The event history is corrupt.
    InvariantViolation,
    /// A lock could not be acquired because another owner holds it.
    LockUnavailable,
    /// A serialized lock token could not be parsed.
    TokenFormat,
    /// The event stream moved past the expected version.
    VersionConflict,
    /// Input validation failed.
    Validation,
    /// The lock backend (Redis or in-memory) failed.
    LockBackend,
    /// The event store failed.
    EventStore,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::InvariantViolation => write!(f, "INVARIANT_VIOLATION"),
            Self::LockUnavailable => write!(f, "LOCK_UNAVAILABLE"),
            Self::TokenFormat => write!(f, "TOKEN_FORMAT"),
            Self::VersionConflict => write!(f, "VERSION_CONFLICT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::LockBackend => write!(f, "LOCK_BACKEND"),
            Self::EventStore => write!(f, "EVENT_STORE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout conference booking.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an invariant-violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation, message)
    }

    /// Create a lock-unavailable error.
    pub fn lock_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockUnavailable, message)
    }

    /// Create a token-format error.
    pub fn token_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenFormat, message)
    }

    /// Create a version-conflict error.
    pub fn version_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VersionConflict, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a lock backend error.
    pub fn lock_backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockBackend, message)
    }

    /// Create an event store error.
    pub fn event_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EventStore, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the caller should reload the stream and try again.
    pub fn is_version_conflict(&self) -> bool {
        self.kind == ErrorKind::VersionConflict
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::conflict("could not obtain session lock");
        assert_eq!(err.to_string(), "CONFLICT: could not obtain session lock");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::from(io);
        assert!(std::error::Error::source(&err).is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_version_conflict_detection() {
        assert!(AppError::version_conflict("stale").is_version_conflict());
        assert!(!AppError::conflict("dup").is_version_conflict());
    }
}
