//! # booking-core
//!
//! Core crate for conference booking. Contains the backend traits
//! (lock store, event store, clock), configuration schemas, typed
//! identifiers, session domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other booking crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
