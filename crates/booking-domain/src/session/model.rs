//! Session snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::types::{SessionId, UserId};

/// A capacity-constrained conference session.
///
/// Invariants maintained by the command handlers that emit its events:
/// - `reservations.len() <= total_seats`
/// - a user appears at most once across `reservations` and `waitlist`
/// - `waitlist` is ordered by `joined_at`, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    pub id: SessionId,
    /// Display title.
    pub title: String,
    /// Seat capacity.
    pub total_seats: u32,
    /// When the session starts.
    pub start_time: DateTime<Utc>,
    /// Seat holders, in reservation order.
    pub reservations: Vec<Reservation>,
    /// Users waiting for a seat, head first.
    pub waitlist: Vec<WaitlistEntry>,
}

/// A held seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Seat holder.
    pub user_id: UserId,
    /// Attendance state.
    pub status: ReservationStatus,
}

/// Attendance state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[default]
    Confirmed,
    Attended,
    NoShow,
    Cancelled,
}

/// A user waiting for a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Waiting user.
    pub user_id: UserId,
    /// When the user joined the waitlist.
    pub joined_at: DateTime<Utc>,
    /// Whether the user has been told about their position.
    pub notified: bool,
}

/// Where a user currently sits in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Reserved,
    Waitlisted,
}

impl Session {
    /// A freshly created session with no members.
    pub fn new(
        id: SessionId,
        title: impl Into<String>,
        total_seats: u32,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            total_seats,
            start_time,
            reservations: Vec::new(),
            waitlist: Vec::new(),
        }
    }

    /// Whether `user_id` holds a seat.
    pub fn is_reserved(&self, user_id: UserId) -> bool {
        self.reservations.iter().any(|r| r.user_id == user_id)
    }

    /// Whether `user_id` is on the waitlist.
    pub fn is_waitlisted(&self, user_id: UserId) -> bool {
        self.waitlist.iter().any(|w| w.user_id == user_id)
    }

    /// Whether another reservation fits.
    pub fn has_free_seat(&self) -> bool {
        self.reservations.len() < self.total_seats as usize
    }

    /// Seats not yet reserved.
    pub fn available_seats(&self) -> u32 {
        self.total_seats
            .saturating_sub(u32::try_from(self.reservations.len()).unwrap_or(u32::MAX))
    }

    /// The user who would be promoted next.
    pub fn waitlist_head(&self) -> Option<&WaitlistEntry> {
        self.waitlist.first()
    }

    /// Where `user_id` sits, if anywhere.
    ///
    /// A user found both reserved and waitlisted means the event history is
    /// corrupt; that is reported as
    /// [`ErrorKind::InvariantViolation`](booking_core::error::ErrorKind::InvariantViolation)
    /// and never repaired here.
    pub fn membership(&self, user_id: UserId) -> AppResult<Option<Membership>> {
        match (self.is_reserved(user_id), self.is_waitlisted(user_id)) {
            (true, true) => Err(AppError::invariant_violation(format!(
                "User {user_id} is both reserved and waitlisted in session {}",
                self.id
            ))),
            (true, false) => Ok(Some(Membership::Reserved)),
            (false, true) => Ok(Some(Membership::Waitlisted)),
            (false, false) => Ok(None),
        }
    }
}
