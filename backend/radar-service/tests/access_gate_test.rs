mod common;

use common::TestApp;
use radar_service::error::{AppError, Denial, Resource};
use radar_service::models::{NewSignal, SendMessage};
use uuid::Uuid;

fn text_to(receiver_id: Uuid, body: &str, signal_id: Option<Uuid>) -> SendMessage {
    SendMessage {
        receiver_id,
        content: Some(body.to_string()),
        media_url: None,
        signal_id,
    }
}

#[tokio::test]
async fn messaging_without_connection_is_forbidden() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.001, 0.0).await;

    let err = app
        .state
        .services
        .messages
        .send(a.id, text_to(b.id, "hello", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Denial::NotConnected)));
}

#[tokio::test]
async fn messaging_yourself_is_an_invalid_target() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let err = app
        .state
        .services
        .access_gate
        .can_send(a.id, a.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Denial::InvalidTarget)));
}

#[tokio::test]
async fn accepted_connection_opens_both_directions() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 40.0, 40.0).await;
    app.connect(a.id, b.id).await;

    let gate = &app.state.services.access_gate;
    gate.can_send(a.id, b.id, None).await.unwrap();
    gate.can_send(b.id, a.id, None).await.unwrap();
}

#[tokio::test]
async fn pending_connection_does_not_open_messaging() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    app.state.services.connections.create(a.id, b.id).await.unwrap();

    let err = app
        .state
        .services
        .access_gate
        .can_send(a.id, b.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Denial::NotConnected)));
}

#[tokio::test]
async fn signal_reply_allowed_in_range_and_rejected_out_of_range() {
    let app = TestApp::new();
    let a = app.user_at("a", 10.0, 10.0).await;
    // ~1.1 km from A
    let c = app.user_at("c", 10.01, 10.0).await;
    // ~11 km from A
    let d = app.user_at("d", 10.1, 10.0).await;

    let signal = app
        .state
        .services
        .signals
        .create(a.id, NewSignal::default())
        .await
        .unwrap();
    let messages = &app.state.services.messages;

    let reply = messages
        .send(c.id, text_to(a.id, "saw your signal", Some(signal.id)))
        .await
        .unwrap();
    assert_eq!(reply.signal_id, Some(signal.id));

    let err = messages
        .send(d.id, text_to(a.id, "me too", Some(signal.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Denial::SignalNotInRange)));
}

#[tokio::test]
async fn signal_reply_requires_visible_positioned_sender() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let signal = app
        .state
        .services
        .signals
        .create(a.id, NewSignal::default())
        .await
        .unwrap();
    let gate = &app.state.services.access_gate;

    let mut hidden = app.user_at("hidden", 0.001, 0.0).await;
    hidden.is_visible = false;
    let hidden = app.update_user(hidden).await;
    assert!(matches!(
        gate.can_send(hidden.id, a.id, Some(signal.id)).await,
        Err(AppError::Forbidden(Denial::InvisibleSender))
    ));

    let nowhere = app.user_without_location("nowhere").await;
    assert!(matches!(
        gate.can_send(nowhere.id, a.id, Some(signal.id)).await,
        Err(AppError::Forbidden(Denial::LocationUnavailable))
    ));

    let near = app.user_at("near", 0.001, 0.0).await;
    assert!(matches!(
        gate.can_send(near.id, a.id, Some(Uuid::new_v4())).await,
        Err(AppError::NotFound(Resource::Signal))
    ));
}

#[tokio::test]
async fn signal_reply_to_hidden_receiver_is_out_of_range() {
    let app = TestApp::new();
    let mut a = app.user_at("a", 0.0, 0.0).await;
    let signal = app
        .state
        .services
        .signals
        .create(a.id, NewSignal::default())
        .await
        .unwrap();
    a.invisible_mode = true;
    app.update_user(a.clone()).await;

    let c = app.user_at("c", 0.001, 0.0).await;
    let err = app
        .state
        .services
        .access_gate
        .can_send(c.id, a.id, Some(signal.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Denial::SignalNotInRange)));
}

#[tokio::test]
async fn unknown_receiver_is_not_found() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let err = app
        .state
        .services
        .messages
        .send(a.id, text_to(Uuid::new_v4(), "hi", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(Resource::User)));
}
