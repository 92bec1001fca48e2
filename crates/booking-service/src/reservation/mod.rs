//! Reservation workflow: create, reserve, cancel, and promote.

pub mod cancel;
pub mod create;
pub mod pipeline;
pub mod promote;
pub mod reserve;
pub mod service;

pub use cancel::{CancelOutcome, CancelReservation};
pub use create::CreateSession;
pub use pipeline::{CommandHandler, Committed, FollowUp, Outcome, Pipeline};
pub use promote::PromoteFromWaitlist;
pub use reserve::{ReserveOutcome, ReserveSeat};
pub use service::ReservationService;
