//! # booking-lock
//!
//! Key-scoped distributed mutual exclusion for conference booking.
//!
//! - [`DistributedLock`] acquires and releases locks with ownership tokens
//!   and TTL expiry, and retries with exponential backoff.
//! - Backends implement [`booking_core::traits::LockBackend`]:
//!   - **memory**: in-process store on [dashmap](https://crates.io/crates/dashmap)
//!   - **redis**: `SET NX PX` plus a Lua compare-and-delete script
//!
//! The backend is selected at runtime based on configuration.

pub mod backoff;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod service;
pub mod token;

pub use backoff::{BackoffPolicy, BackoffStrategy};
pub use provider::LockBackendManager;
pub use service::{DistributedLock, ScopedLock};
pub use token::LockToken;
