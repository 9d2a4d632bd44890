#![allow(dead_code)]

use radar_service::config::Config;
use radar_service::models::{ConnectionStatus, User};
use radar_service::repository::{InMemoryStore, Repositories};
use radar_service::services::notifier::{PushError, PushGateway, PushNotification};
use radar_service::state::AppState;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Push gateway that records what would have been sent
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, PushNotification)>>,
}

impl RecordingGateway {
    pub fn sent(&self) -> Vec<(String, PushNotification)> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PushGateway for RecordingGateway {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), PushError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((device_token.to_string(), notification.clone()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
    pub pushes: Arc<RecordingGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::test_defaults())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let pushes = Arc::new(RecordingGateway::default());
        let state = AppState::new(
            config,
            Repositories::in_memory(store.clone()),
            pushes.clone(),
        );
        Self {
            store,
            state,
            pushes,
        }
    }

    /// Visible, verified user with a device token at the given position
    pub async fn user_at(&self, name: &str, latitude: f64, longitude: f64) -> User {
        let mut user = User::new(format!("{name}@example.com"), name);
        user.latitude = Some(latitude);
        user.longitude = Some(longitude);
        user.device_token = Some(format!("device-{name}"));
        self.store.put_user(user).await
    }

    pub async fn user_without_location(&self, name: &str) -> User {
        self.store
            .put_user(User::new(format!("{name}@example.com"), name))
            .await
    }

    pub async fn update_user(&self, user: User) -> User {
        self.store.put_user(user).await
    }

    /// Request + accept, leaving an accepted connection `a -> b`
    pub async fn connect(&self, a: Uuid, b: Uuid) {
        let services = &self.state.services;
        let connection = services
            .connections
            .create(a, b)
            .await
            .expect("connection request");
        services
            .connections
            .update_status(b, connection.id, ConnectionStatus::Accepted)
            .await
            .expect("accept");
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .verifier
            .issue(user.id, &user.email, chrono::Duration::minutes(10))
            .expect("issue token")
    }
}
