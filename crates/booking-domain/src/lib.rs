//! # booking-domain
//!
//! The session aggregate. A [`Session`] is never stored; it is rebuilt by
//! folding the session's event stream with [`session::apply`].

pub mod session;

pub use session::{Membership, Reservation, ReservationStatus, Session, WaitlistEntry};
