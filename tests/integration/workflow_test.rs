//! Integration tests for the reserve, cancel, and promote workflow.

mod helpers;

use booking_core::config::AppConfig;
use booking_core::error::ErrorKind;
use booking_core::traits::EventStore;
use booking_core::types::UserId;
use booking_domain::session::replay;
use booking_service::reservation::{CancelOutcome, ReserveOutcome};

#[tokio::test]
async fn test_first_n_reserve_then_waitlist() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(3).await;

    let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
    let mut outcomes = Vec::new();
    for user in &users {
        outcomes.push(app.reserve(session_id, *user).await.unwrap());
    }

    assert_eq!(
        outcomes,
        vec![
            ReserveOutcome::Reserved,
            ReserveOutcome::Reserved,
            ReserveOutcome::Reserved,
            ReserveOutcome::Waitlisted,
        ]
    );
    let session = app.session(session_id).await;
    assert_eq!(session.reservations.len(), 3);
    assert_eq!(session.waitlist.len(), 1);
    assert_eq!(session.waitlist[0].user_id, users[3]);
}

#[tokio::test]
async fn test_cancel_hands_seat_to_waitlisted_user() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(1).await;
    let (a, b) = (UserId::new(), UserId::new());

    assert_eq!(app.reserve(session_id, a).await.unwrap(), ReserveOutcome::Reserved);
    assert_eq!(app.reserve(session_id, b).await.unwrap(), ReserveOutcome::Waitlisted);
    assert_eq!(app.cancel(session_id, a).await.unwrap(), CancelOutcome::SeatReleased);

    let session = app.session(session_id).await;
    assert!(session.is_reserved(b));
    assert!(session.waitlist.is_empty());
    assert!(!session.is_reserved(a) && !session.is_waitlisted(a));

    assert_eq!(
        app.event_types(session_id).await,
        vec![
            "Created",
            "SeatReserved",
            "UserWaitlisted",
            "ReservationCancelled",
            "TopWaitlistPromoted",
        ]
    );

    // One lock window covered both the cancellation and the promotion.
    let key = format!("lock:{}", app.session_lock_key(session_id));
    assert_eq!(
        app.backend.events().await,
        vec![
            helpers::LockEvent::Acquired(key.clone()),
            helpers::LockEvent::Released(key),
        ]
    );
    assert_eq!(app.lock.holder(&app.session_lock_key(session_id)).await.unwrap(), None);
}

#[tokio::test]
async fn test_promotion_is_first_in_first_out() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(1).await;
    let holder = UserId::new();
    let waiting: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();

    app.reserve(session_id, holder).await.unwrap();
    for user in &waiting {
        assert_eq!(
            app.reserve(session_id, *user).await.unwrap(),
            ReserveOutcome::Waitlisted
        );
    }

    app.cancel(session_id, holder).await.unwrap();
    let session = app.session(session_id).await;
    assert!(session.is_reserved(waiting[0]));

    app.cancel(session_id, waiting[0]).await.unwrap();
    let session = app.session(session_id).await;
    assert!(session.is_reserved(waiting[1]));
    assert_eq!(session.waitlist.len(), 1);
    assert_eq!(session.waitlist[0].user_id, waiting[2]);
}

#[tokio::test]
async fn test_waitlisted_user_leaves_without_promotion() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(1).await;
    let (a, b) = (UserId::new(), UserId::new());
    app.reserve(session_id, a).await.unwrap();
    app.reserve(session_id, b).await.unwrap();

    assert_eq!(app.cancel(session_id, b).await.unwrap(), CancelOutcome::LeftWaitlist);

    let session = app.session(session_id).await;
    assert!(session.is_reserved(a));
    assert!(session.waitlist.is_empty());
    assert!(app.backend.events().await.is_empty());
}

#[tokio::test]
async fn test_cancel_unknown_membership_is_not_found() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(2).await;

    let err = app.cancel(session_id, UserId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_replaying_stored_history_is_deterministic() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(2).await;
    let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
    for user in &users {
        app.reserve(session_id, *user).await.unwrap();
    }
    app.cancel(session_id, users[0]).await.unwrap();
    app.cancel(session_id, users[3]).await.unwrap();

    let history: Vec<_> = app
        .store
        .load(session_id)
        .await
        .unwrap()
        .into_iter()
        .map(|recorded| recorded.event)
        .collect();

    let first = replay(&history);
    let second = replay(&history);
    assert_eq!(first, second);
    assert_eq!(first.as_ref(), Some(&app.session(session_id).await));
}

#[tokio::test]
async fn test_concurrent_reservations_never_overbook() {
    let app = helpers::TestApp::new();
    let session_id = app.create_session(2).await;
    let users: Vec<UserId> = (0..6).map(|_| UserId::new()).collect();

    let results =
        futures::future::join_all(users.iter().map(|user| app.reserve(session_id, *user))).await;

    let reserved = results
        .iter()
        .filter(|r| matches!(r, Ok(ReserveOutcome::Reserved)))
        .count();
    let waitlisted = results
        .iter()
        .filter(|r| matches!(r, Ok(ReserveOutcome::Waitlisted)))
        .count();
    assert_eq!(reserved, 2);
    assert_eq!(waitlisted, 4);

    let session = app.session(session_id).await;
    assert_eq!(session.reservations.len(), 2);
    assert_eq!(session.waitlist.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancels_never_overlap_on_the_session_lock() {
    let mut config = AppConfig::default();
    config.lock.session.max_attempts = 50;
    config.lock.session.initial_backoff_ms = 5;
    config.lock.session.max_backoff_ms = 50;
    config.workflow.append_retries = 20;
    let app = std::sync::Arc::new(helpers::TestApp::with_config(config));

    let session_id = app.create_session(4).await;
    let holders: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
    let waiting: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
    for user in holders.iter().chain(waiting.iter()) {
        app.reserve(session_id, *user).await.unwrap();
    }

    let tasks: Vec<_> = holders
        .iter()
        .map(|user| {
            let app = app.clone();
            let user = *user;
            tokio::spawn(async move { app.cancel(session_id, user).await })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), CancelOutcome::SeatReleased);
    }

    app.backend.assert_no_overlapping_holds().await;

    let session = app.session(session_id).await;
    let reserved: Vec<UserId> = session.reservations.iter().map(|r| r.user_id).collect();
    assert_eq!(reserved, waiting);
    assert!(session.waitlist.is_empty());
}
