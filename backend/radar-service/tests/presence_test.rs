mod common;

use common::TestApp;
use radar_service::models::SendMessage;
use radar_service::repository::UserRepository;
use radar_service::routes::wsroute::{handle_inbound, inbound_worker};
use radar_service::websocket::{WsInboundEvent, WsOutboundEvent};

fn parse(raw: &str) -> WsOutboundEvent {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn new_message_fans_out_to_both_participants() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    app.connect(a.id, b.id).await;

    let (_sa, mut a_rx) = app.state.presence.register(a.id).await;
    let (_sb1, mut b_rx1) = app.state.presence.register(b.id).await;
    let (_sb2, mut b_rx2) = app.state.presence.register(b.id).await;

    let sent = app
        .state
        .services
        .messages
        .send(
            a.id,
            SendMessage {
                receiver_id: b.id,
                content: Some("ping".into()),
                media_url: None,
                signal_id: None,
            },
        )
        .await
        .unwrap();

    for rx in [&mut a_rx, &mut b_rx1, &mut b_rx2] {
        match parse(&rx.recv().await.unwrap()) {
            WsOutboundEvent::NewMessage { message } => assert_eq!(message.id, sent.id),
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test]
async fn location_update_echoes_to_own_channel_only() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    let (sa, mut a_rx) = app.state.presence.register(a.id).await;
    let (_sb, mut b_rx) = app.state.presence.register(b.id).await;

    handle_inbound(
        &app.state,
        a.id,
        sa,
        WsInboundEvent::LocationUpdate {
            latitude: 1.5,
            longitude: 2.5,
        },
    )
    .await;

    match parse(&a_rx.recv().await.unwrap()) {
        WsOutboundEvent::LocationUpdate {
            user_id,
            latitude,
            longitude,
        } => {
            assert_eq!(user_id, a.id);
            assert_eq!((latitude, longitude), (1.5, 2.5));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(b_rx.try_recv().is_err());

    // not persisted
    let stored = UserRepository::find_by_id(app.store.as_ref(), a.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.latitude, Some(0.0));
    assert_eq!(stored.longitude, Some(0.0));
}

#[tokio::test]
async fn invalid_location_reports_error_to_originating_session() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let (s1, mut rx1) = app.state.presence.register(a.id).await;
    let (_s2, mut rx2) = app.state.presence.register(a.id).await;

    handle_inbound(
        &app.state,
        a.id,
        s1,
        WsInboundEvent::LocationUpdate {
            latitude: 123.0,
            longitude: 0.0,
        },
    )
    .await;

    match parse(&rx1.recv().await.unwrap()) {
        WsOutboundEvent::Error { code, .. } => assert_eq!(code, "INVALID_COORDINATES"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn unauthorized_ws_message_returns_error_event() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    let (sa, mut a_rx) = app.state.presence.register(a.id).await;
    let (_sb, mut b_rx) = app.state.presence.register(b.id).await;

    handle_inbound(
        &app.state,
        a.id,
        sa,
        WsInboundEvent::Message {
            receiver_id: b.id,
            content: Some("hi".into()),
            media_url: None,
            signal_id: None,
        },
    )
    .await;

    match parse(&a_rx.recv().await.unwrap()) {
        WsOutboundEvent::Error { code, .. } => assert_eq!(code, "NOT_CONNECTED"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(b_rx.try_recv().is_err());
}

#[tokio::test]
async fn typing_is_relayed_once_to_receiver() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    app.connect(a.id, b.id).await;
    let (sa, mut a_rx) = app.state.presence.register(a.id).await;
    let (_sb, mut b_rx) = app.state.presence.register(b.id).await;

    handle_inbound(&app.state, a.id, sa, WsInboundEvent::Typing { receiver_id: b.id }).await;
    handle_inbound(
        &app.state,
        a.id,
        sa,
        WsInboundEvent::StopTyping { receiver_id: b.id },
    )
    .await;

    assert!(matches!(
        parse(&b_rx.recv().await.unwrap()),
        WsOutboundEvent::Typing { sender_id } if sender_id == a.id
    ));
    assert!(matches!(
        parse(&b_rx.recv().await.unwrap()),
        WsOutboundEvent::StopTyping { sender_id } if sender_id == a.id
    ));
    assert!(b_rx.try_recv().is_err());
    assert!(a_rx.try_recv().is_err());
}

#[tokio::test]
async fn typing_to_a_stranger_is_dropped() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let stranger = app.user_at("stranger", 0.0, 0.0).await;
    let (sa, mut a_rx) = app.state.presence.register(a.id).await;
    let (_ss, mut stranger_rx) = app.state.presence.register(stranger.id).await;

    handle_inbound(
        &app.state,
        a.id,
        sa,
        WsInboundEvent::Typing {
            receiver_id: stranger.id,
        },
    )
    .await;

    assert!(stranger_rx.try_recv().is_err());
    assert!(a_rx.try_recv().is_err());
}

#[tokio::test]
async fn typing_is_relayed_within_an_existing_thread() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    let messages = &app.state.services.messages;

    assert!(!messages.relay_typing(a.id, b.id, true).await.unwrap());

    // a signal reply opens a thread without a connection
    let signal = app
        .state
        .services
        .signals
        .create(b.id, Default::default())
        .await
        .unwrap();
    messages
        .send(
            a.id,
            SendMessage {
                receiver_id: b.id,
                content: Some("saw your signal".into()),
                media_url: None,
                signal_id: Some(signal.id),
            },
        )
        .await
        .unwrap();

    assert!(messages.relay_typing(b.id, a.id, true).await.unwrap());
    assert!(!messages.relay_typing(a.id, a.id, true).await.unwrap());
}

#[tokio::test]
async fn inbound_events_from_one_session_are_handled_in_order() {
    let app = TestApp::new();
    let a = app.user_at("a", 0.0, 0.0).await;
    let b = app.user_at("b", 0.0, 0.0).await;
    app.connect(a.id, b.id).await;
    let (sa, _a_rx) = app.state.presence.register(a.id).await;

    let (tx, worker) = inbound_worker(app.state.clone(), a.id, sa);
    for body in ["first", "second", "third"] {
        tx.send(WsInboundEvent::Message {
            receiver_id: b.id,
            content: Some(body.into()),
            media_url: None,
            signal_id: None,
        })
        .unwrap();
    }
    drop(tx);
    worker.await;

    let thread = app
        .state
        .services
        .messages
        .list_between(b.id, a.id)
        .await
        .unwrap();
    let bodies: Vec<_> = thread.iter().filter_map(|m| m.content.as_deref()).collect();
    assert_eq!(bodies, ["first", "second", "third"]);
}

#[tokio::test]
async fn stored_location_update_echoes_and_persists() {
    let app = TestApp::new();
    let a = app.user_without_location("a").await;
    let (_sa, mut a_rx) = app.state.presence.register(a.id).await;

    let updated = app
        .state
        .services
        .location
        .update_location(a.id, 48.85, 2.35)
        .await
        .unwrap();
    assert_eq!(updated.latitude, Some(48.85));
    assert!(updated.location_updated_at.is_some());
    assert!(matches!(
        parse(&a_rx.recv().await.unwrap()),
        WsOutboundEvent::LocationUpdate { .. }
    ));
}
