//! Pluggable backend traits.
//!
//! Implementations live in other crates: lock backends in `booking-lock`,
//! the event store in `booking-store`.

pub mod clock;
pub mod event_store;
pub mod lock_backend;

pub use clock::{Clock, SystemClock};
pub use event_store::EventStore;
pub use lock_backend::LockBackend;
