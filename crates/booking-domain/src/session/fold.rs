//! The session fold: `(state, event) -> state`.
//!
//! Replaying the same history from `None` always yields the same snapshot.
//! Nothing here reads the clock or any other ambient input; timestamps come
//! from the events themselves.

use booking_core::events::SessionEvent;

use super::model::{Reservation, ReservationStatus, Session, WaitlistEntry};

/// Apply one event to the current state, producing the next state.
///
/// Events that cannot apply (anything before `Created`, a second `Created`,
/// a promotion with an empty waitlist) leave the state unchanged.
pub fn apply(state: Option<Session>, event: &SessionEvent) -> Option<Session> {
    match (state, event) {
        (
            None,
            SessionEvent::Created {
                session_id,
                title,
                total_seats,
                start_time,
            },
        ) => Some(Session::new(
            *session_id,
            title.clone(),
            *total_seats,
            *start_time,
        )),
        (None, _) => None,
        (Some(session), SessionEvent::Created { .. }) => Some(session),
        (Some(session), event) => Some(apply_to_session(session, event)),
    }
}

fn apply_to_session(mut session: Session, event: &SessionEvent) -> Session {
    match event {
        SessionEvent::Created { .. } => {}
        SessionEvent::SeatReserved { user_id, .. } => {
            session.reservations.push(Reservation {
                user_id: *user_id,
                status: ReservationStatus::Confirmed,
            });
        }
        SessionEvent::UserWaitlisted {
            user_id, joined_at, ..
        } => {
            session.waitlist.push(WaitlistEntry {
                user_id: *user_id,
                joined_at: *joined_at,
                notified: false,
            });
        }
        SessionEvent::ReservationCancelled { user_id, .. } => {
            session.reservations.retain(|r| r.user_id != *user_id);
        }
        SessionEvent::WaitlistEntryReleased { user_id, .. } => {
            session.waitlist.retain(|w| w.user_id != *user_id);
        }
        SessionEvent::TopWaitlistPromoted { .. } => {
            if !session.waitlist.is_empty() {
                let head = session.waitlist.remove(0);
                session.reservations.push(Reservation {
                    user_id: head.user_id,
                    status: ReservationStatus::Confirmed,
                });
            }
        }
    }
    session
}

/// Fold a whole history, oldest event first.
pub fn replay<'a, I>(events: I) -> Option<Session>
where
    I: IntoIterator<Item = &'a SessionEvent>,
{
    events.into_iter().fold(None, apply)
}
