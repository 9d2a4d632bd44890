mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use radar_service::error::AppError;
use radar_service::models::{Event, NewSignal};
use radar_service::repository::EventRepository;
use uuid::Uuid;

#[tokio::test]
async fn nearby_user_respects_radius() {
    let app = TestApp::new();
    let a = app.user_at("a", 10.0, 10.0).await;
    let b = app.user_at("b", 10.001, 10.001).await;
    let radar = &app.state.services.proximity;

    let wide = radar.get_nearby(a.id, 10.0, 10.0, 1000.0).await.unwrap();
    let hit = wide.users.iter().find(|u| u.id == b.id).expect("B on radar");
    assert!(hit.distance < 1000.0);
    assert!(hit.distance > 100.0);

    let narrow = radar.get_nearby(a.id, 10.0, 10.0, 100.0).await.unwrap();
    assert!(narrow.users.iter().all(|u| u.id != b.id));
}

#[tokio::test]
async fn results_are_within_radius_and_sorted() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    for (i, offset) in [0.03, 0.001, 0.02, 0.2, 0.005].iter().enumerate() {
        app.user_at(&format!("u{i}"), *offset, 0.0).await;
    }

    let result = app
        .state
        .services
        .proximity
        .get_nearby(me.id, 0.0, 0.0, 5000.0)
        .await
        .unwrap();

    assert_eq!(result.users.len(), 4);
    assert!(result.users.iter().all(|u| u.distance <= 5000.0));
    assert!(result
        .users
        .windows(2)
        .all(|w| w[0].distance <= w[1].distance));
    assert!(result.users.iter().all(|u| u.id != me.id));
}

#[tokio::test]
async fn hidden_unverified_and_unpositioned_users_are_excluded() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;

    let mut invisible = app.user_at("invisible", 0.001, 0.0).await;
    invisible.is_visible = false;
    app.update_user(invisible).await;

    let mut ghost = app.user_at("ghost", 0.001, 0.0).await;
    ghost.invisible_mode = true;
    app.update_user(ghost).await;

    let mut unverified = app.user_at("unverified", 0.001, 0.0).await;
    unverified.is_verified = false;
    app.update_user(unverified).await;

    app.user_without_location("nowhere").await;
    let visible = app.user_at("visible", 0.002, 0.0).await;

    let result = app
        .state
        .services
        .proximity
        .get_nearby(me.id, 0.0, 0.0, 1000.0)
        .await
        .unwrap();
    let ids: Vec<Uuid> = result.users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![visible.id]);
}

#[tokio::test]
async fn privacy_flags_are_applied() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    let mut shy = app.user_at("shy", 0.001, 0.0).await;
    shy.age = Some(31);
    shy.show_age = false;
    shy.show_location = false;
    app.update_user(shy).await;

    let result = app
        .state
        .services
        .proximity
        .get_nearby(me.id, 0.0, 0.0, 1000.0)
        .await
        .unwrap();
    let entry = &result.users[0];
    assert_eq!(entry.age, None);
    assert_eq!(entry.latitude, None);
    assert_eq!(entry.longitude, None);
    assert!(entry.distance > 0.0);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    let radar = &app.state.services.proximity;

    assert!(matches!(
        radar.get_nearby(me.id, 91.0, 0.0, 100.0).await,
        Err(AppError::InvalidCoordinates)
    ));
    assert!(matches!(
        radar.get_nearby(me.id, 0.0, 0.0, 0.0).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        radar.get_nearby(me.id, 0.0, 0.0, 60_000.0).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn radar_push_only_when_users_found() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    let radar = &app.state.services.proximity;

    radar.get_nearby(me.id, 0.0, 0.0, 1000.0).await.unwrap();
    assert!(app.pushes.sent().is_empty());

    app.user_at("other", 0.001, 0.0).await;
    radar.get_nearby(me.id, 0.0, 0.0, 1000.0).await.unwrap();
    let sent = app.pushes.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "device-me");
}

#[tokio::test]
async fn signals_use_sender_position_and_skip_own_and_hidden() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    let near = app.user_at("near", 0.001, 0.0).await;
    let mut hidden = app.user_at("hidden", 0.001, 0.0).await;
    let far = app.user_at("far", 1.0, 0.0).await;
    let signals = &app.state.services.signals;

    signals.create(me.id, NewSignal::default()).await.unwrap();
    let visible_signal = signals
        .create(
            near.id,
            NewSignal {
                note: Some("coffee?".into()),
            },
        )
        .await
        .unwrap();
    signals.create(hidden.id, NewSignal::default()).await.unwrap();
    signals.create(far.id, NewSignal::default()).await.unwrap();

    hidden.invisible_mode = true;
    app.update_user(hidden).await;

    let result = app
        .state
        .services
        .proximity
        .get_nearby(me.id, 0.0, 0.0, 1000.0)
        .await
        .unwrap();
    assert_eq!(result.signals.len(), 1);
    assert_eq!(result.signals[0].signal.id, visible_signal.id);
    assert_eq!(result.signals[0].sender_display_name, "near");
}

#[tokio::test]
async fn boosted_events_come_first() {
    let app = TestApp::new();
    let me = app.user_at("me", 0.0, 0.0).await;
    let now = Utc::now();
    let make = |title: &str, lat: f64, boosted: bool| Event {
        id: Uuid::new_v4(),
        organizer_id: me.id,
        title: title.to_string(),
        description: None,
        latitude: lat,
        longitude: 0.0,
        starts_at: now + Duration::days(1),
        is_boosted: boosted,
        boosted_at: boosted.then_some(now),
        boost_expires_at: boosted.then_some(now + Duration::days(1)),
        created_at: now,
    };
    for event in [
        make("close", 0.001, false),
        make("boosted-far", 0.008, true),
        make("middle", 0.004, false),
        make("out-of-range", 0.5, true),
    ] {
        EventRepository::insert(app.store.as_ref(), &event).await.unwrap();
    }

    let result = app
        .state
        .services
        .proximity
        .get_nearby(me.id, 0.0, 0.0, 1000.0)
        .await
        .unwrap();
    let titles: Vec<&str> = result.events.iter().map(|e| e.event.title.as_str()).collect();
    assert_eq!(titles, vec!["boosted-far", "close", "middle"]);
}
