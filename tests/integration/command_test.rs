//! Integration tests for the JSON command surface.

mod helpers;

use serde_json::{Value, json};

use booking_core::error::ErrorKind;
use booking_core::events::SessionEvent;
use booking_core::traits::EventStore;
use booking_core::types::{SessionId, UserId, Version};
use booking_service::commands::{handle, parse_request};

async fn send(app: &helpers::TestApp, request: Value) -> Value {
    let request = parse_request(&request.to_string()).expect("request should parse");
    let reply = handle(&app.service, request).await.expect("command should reply");
    serde_json::to_value(reply).unwrap()
}

#[tokio::test]
async fn test_reservation_scenario_over_the_wire() {
    let app = helpers::TestApp::new();
    let session_id = SessionId::new();
    let (a, b) = (UserId::new(), UserId::new());

    let reply = send(
        &app,
        json!({
            "command": "createSession",
            "sessionId": session_id,
            "title": "Unsafe Rust",
            "seats": 1,
            "startTime": "2026-11-03T09:00:00Z"
        }),
    )
    .await;
    assert_eq!(reply["status"], "accepted");

    let reserve = |user: UserId| json!({"command": "reserveSeat", "sessionId": session_id, "userId": user});
    assert_eq!(send(&app, reserve(a)).await["status"], "reserved");
    assert_eq!(send(&app, reserve(b)).await["status"], "waitlisted");
    assert_eq!(send(&app, reserve(b)).await["status"], "conflict");

    let reply = send(
        &app,
        json!({"command": "cancelReservation", "sessionId": session_id, "userId": a}),
    )
    .await;
    assert_eq!(reply["status"], "accepted");

    let reply = send(&app, json!({"command": "getSession", "sessionId": session_id})).await;
    assert_eq!(reply["status"], "session");
    assert_eq!(reply["session"]["reservations"][0]["userId"], json!(b));
    assert_eq!(reply["session"]["waitlist"], json!([]));
}

#[tokio::test]
async fn test_missing_session_replies_not_found() {
    let app = helpers::TestApp::new();
    let reply = send(
        &app,
        json!({"command": "cancelReservation", "sessionId": SessionId::new(), "userId": UserId::new()}),
    )
    .await;
    assert_eq!(reply["status"], "notFound");
}

#[tokio::test]
async fn test_create_with_negative_seats_is_accepted_but_creates_nothing() {
    let app = helpers::TestApp::new();
    let session_id = SessionId::new();
    let reply = send(
        &app,
        json!({
            "command": "createSession",
            "sessionId": session_id,
            "title": "Negative",
            "seats": -3,
            "startTime": "2026-11-03T09:00:00Z"
        }),
    )
    .await;
    assert_eq!(reply["status"], "accepted");

    let reply = send(&app, json!({"command": "getSession", "sessionId": session_id})).await;
    assert_eq!(reply["status"], "notFound");
}

#[tokio::test]
async fn test_promote_with_bad_token_is_invalid() {
    let app = helpers::TestApp::new();
    let reply = send(
        &app,
        json!({"command": "promoteFromWaitlist", "sessionId": SessionId::new(), "token": "{oops"}),
    )
    .await;
    assert_eq!(reply["status"], "invalid");
}

#[tokio::test]
async fn test_corrupt_history_is_not_turned_into_a_reply() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(2).await;
    let user_id = UserId::new();
    app.store
        .append(
            session_id,
            Version::new(1),
            vec![
                SessionEvent::SeatReserved { session_id, user_id },
                SessionEvent::UserWaitlisted {
                    session_id,
                    user_id,
                    joined_at: chrono::Utc::now(),
                },
            ],
        )
        .await
        .unwrap();

    let request = parse_request(
        &json!({"command": "cancelReservation", "sessionId": session_id, "userId": user_id})
            .to_string(),
    )
    .unwrap();
    let err = handle(&app.service, request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvariantViolation);
}
