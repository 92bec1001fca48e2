//! Session snapshot and fold.

pub mod fold;
pub mod model;

pub use fold::{apply, replay};
pub use model::{Membership, Reservation, ReservationStatus, Session, WaitlistEntry};
