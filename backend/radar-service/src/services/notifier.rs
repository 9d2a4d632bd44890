//! Best-effort push notifications.
//!
//! Delivery failures never fail the operation that triggered them: they are
//! logged at `warn` and dropped.

use crate::repository::UserRepository;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Request(String),
    #[error("push gateway rejected notification: {status} - {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait::async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), PushError>;
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    device_token: &'a str,
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

/// POSTs `{device_token, title, body}` to an external push gateway
pub struct HttpPushGateway {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpPushGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), PushError> {
        let request = GatewayRequest {
            device_token,
            title: &notification.title,
            body: &notification.body,
            data: notification.data.as_ref(),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| PushError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(PushError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Gateway used when no push endpoint is configured
#[derive(Default)]
pub struct LoggingPushGateway;

#[async_trait::async_trait]
impl PushGateway for LoggingPushGateway {
    async fn send(
        &self,
        _device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), PushError> {
        tracing::info!(title = %notification.title, body = %notification.body, "push (log only)");
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn PushGateway>,
}

impl Notifier {
    pub fn new(users: Arc<dyn UserRepository>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { users, gateway }
    }

    /// Push to the user's registered device, if any. Never returns an error.
    pub async fn notify_best_effort(&self, user_id: Uuid, notification: PushNotification) {
        let device_token = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.device_token,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "push skipped: user lookup failed");
                return;
            }
        };

        let Some(device_token) = device_token else {
            tracing::debug!(user_id = %user_id, "push skipped: no device token");
            return;
        };

        if let Err(e) = self.gateway.send(&device_token, &notification).await {
            tracing::warn!(user_id = %user_id, error = %e, "push delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repository::InMemoryStore;

    struct FailingGateway;

    #[async_trait::async_trait]
    impl PushGateway for FailingGateway {
        async fn send(&self, _: &str, _: &PushNotification) -> Result<(), PushError> {
            Err(PushError::Request("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn gateway_failure_is_swallowed() {
        let store = Arc::new(InMemoryStore::new());
        let mut user = User::new("a@example.com", "A");
        user.device_token = Some("device-1".into());
        let user = store.put_user(user).await;

        let notifier = Notifier::new(store, Arc::new(FailingGateway));
        notifier
            .notify_best_effort(user.id, PushNotification::new("t", "b"))
            .await;
    }
}
