//! # booking-store
//!
//! Event persistence for session aggregates: an in-memory [`EventStore`]
//! implementation and the [`SessionRepository`] that rehydrates sessions by
//! replaying their streams.
//!
//! [`EventStore`]: booking_core::traits::EventStore

pub mod memory;
pub mod repository;

pub use memory::InMemoryEventStore;
pub use repository::{LoadedSession, SessionRepository};
