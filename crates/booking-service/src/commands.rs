//! Command surface for collaborators.
//!
//! Requests and replies are tagged JSON objects
//! (`{"command":"reserveSeat",...}` → `{"status":"reserved",...}`). Expected
//! business outcomes become replies; only failures a caller cannot act on
//! are returned as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;
use booking_core::types::{SessionId, UserId};
use booking_domain::Session;
use booking_lock::LockToken;

use crate::reservation::{
    CancelReservation, CreateSession, PromoteFromWaitlist, ReservationService, ReserveOutcome,
    ReserveSeat,
};

/// A command sent by a collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandRequest {
    CreateSession {
        session_id: SessionId,
        title: String,
        seats: i64,
        start_time: DateTime<Utc>,
    },
    ReserveSeat {
        session_id: SessionId,
        user_id: UserId,
    },
    CancelReservation {
        session_id: SessionId,
        user_id: UserId,
    },
    /// Promote under a token in its compact string form.
    PromoteFromWaitlist {
        session_id: SessionId,
        token: String,
    },
    GetSession {
        session_id: SessionId,
    },
}

/// The reply to a [`CommandRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandReply {
    Reserved {
        session_id: SessionId,
        user_id: UserId,
    },
    Waitlisted {
        session_id: SessionId,
        user_id: UserId,
    },
    Accepted {
        session_id: SessionId,
    },
    NotFound {
        message: String,
    },
    Conflict {
        message: String,
    },
    Invalid {
        message: String,
    },
    Session {
        session: Session,
    },
}

impl CommandReply {
    /// The reply for an error a caller can act on, or `None` for errors
    /// that must propagate (invariant violations, backend failures).
    pub fn from_error(err: &AppError) -> Option<Self> {
        let message = err.message.clone();
        match err.kind {
            ErrorKind::NotFound => Some(Self::NotFound { message }),
            ErrorKind::Conflict | ErrorKind::LockUnavailable => Some(Self::Conflict { message }),
            ErrorKind::Validation | ErrorKind::TokenFormat | ErrorKind::Serialization => {
                Some(Self::Invalid { message })
            }
            _ => None,
        }
    }
}

/// Run `request` against `service`.
pub async fn handle(service: &ReservationService, request: CommandRequest) -> AppResult<CommandReply> {
    let result = match request {
        CommandRequest::CreateSession {
            session_id,
            title,
            seats,
            start_time,
        } => service
            .create_session(CreateSession {
                session_id,
                title,
                seats,
                start_time,
            })
            .await
            .map(|_| CommandReply::Accepted { session_id }),
        CommandRequest::ReserveSeat {
            session_id,
            user_id,
        } => service
            .reserve(ReserveSeat {
                session_id,
                user_id,
            })
            .await
            .map(|outcome| match outcome {
                ReserveOutcome::Reserved => CommandReply::Reserved {
                    session_id,
                    user_id,
                },
                ReserveOutcome::Waitlisted => CommandReply::Waitlisted {
                    session_id,
                    user_id,
                },
            }),
        CommandRequest::CancelReservation {
            session_id,
            user_id,
        } => service
            .cancel(CancelReservation {
                session_id,
                user_id,
            })
            .await
            .map(|_| CommandReply::Accepted { session_id }),
        CommandRequest::PromoteFromWaitlist { session_id, token } => {
            match LockToken::parse(&token) {
                Ok(token) => {
                    service
                        .promote(PromoteFromWaitlist { session_id, token })
                        .await;
                    Ok(CommandReply::Accepted { session_id })
                }
                Err(e) => Err(e),
            }
        }
        CommandRequest::GetSession { session_id } => service
            .get_session(session_id)
            .await
            .map(|session| CommandReply::Session { session }),
    };

    match result {
        Ok(reply) => Ok(reply),
        Err(e) => CommandReply::from_error(&e).ok_or(e),
    }
}

/// Parse one request line, answering malformed input with an `invalid` reply.
pub fn parse_request(line: &str) -> Result<CommandRequest, CommandReply> {
    serde_json::from_str(line).map_err(|e| CommandReply::Invalid {
        message: format!("Malformed command: {e}"),
    })
}
