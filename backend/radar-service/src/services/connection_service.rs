use crate::config::LimitsConfig;
use crate::error::{AppError, AppResult, Denial, Resource};
use crate::models::{Connection, ConnectionStatus};
use crate::repository::{ConnectionRepository, UserRepository};
use crate::services::notifier::{Notifier, PushNotification};
use crate::websocket::{PresenceRegistry, WsOutboundEvent};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ConnectionService {
    users: Arc<dyn UserRepository>,
    connections: Arc<dyn ConnectionRepository>,
    presence: PresenceRegistry,
    notifier: Notifier,
    limits: LimitsConfig,
}

impl ConnectionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        connections: Arc<dyn ConnectionRepository>,
        presence: PresenceRegistry,
        notifier: Notifier,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            users,
            connections,
            presence,
            notifier,
            limits,
        }
    }

    /// Send a connection request from `sender_id` to `receiver_id`
    pub async fn create(&self, sender_id: Uuid, receiver_id: Uuid) -> AppResult<Connection> {
        if sender_id == receiver_id {
            return Err(AppError::Forbidden(Denial::InvalidTarget));
        }

        let sender = self
            .users
            .find_by_id(sender_id)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;
        if self.users.find_by_id(receiver_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        if self
            .connections
            .find_between(sender_id, receiver_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "a connection between these users already exists".into(),
            ));
        }

        if !sender.is_premium() {
            let since = Utc::now() - Duration::hours(24);
            let sent = self.connections.count_sent_since(sender_id, since).await?;
            if sent >= self.limits.free_daily_connection_requests {
                tracing::info!(sender_id = %sender_id, sent, "connection request rate limited");
                return Err(AppError::RateLimited);
            }
        }

        // insert still maps a racing duplicate to Conflict
        let connection = self
            .connections
            .insert(&Connection::new_pending(sender_id, receiver_id))
            .await?;

        tracing::info!(
            connection_id = %connection.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            "connection requested"
        );

        self.presence
            .emit(
                receiver_id,
                &WsOutboundEvent::ConnectionRequest {
                    connection: connection.clone(),
                    sender: Some(sender.summary()),
                },
            )
            .await;
        self.notifier
            .notify_best_effort(
                receiver_id,
                PushNotification::new(
                    "New connection request",
                    format!("{} wants to connect", sender.display_name),
                )
                .with_data(serde_json::json!({
                    "type": "connection_request",
                    "connection_id": connection.id,
                })),
            )
            .await;

        Ok(connection)
    }

    /// Accept or reject a pending request. Only its receiver may do this,
    /// and only once.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        connection_id: Uuid,
        status: ConnectionStatus,
    ) -> AppResult<Connection> {
        if status == ConnectionStatus::Pending {
            return Err(AppError::Validation(
                "status must be accepted or rejected".into(),
            ));
        }

        let existing = self
            .connections
            .find_by_id(connection_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Connection))?;
        if existing.receiver_id != user_id {
            return Err(AppError::Forbidden(Denial::NotReceiver));
        }
        if existing.status.is_terminal() {
            return Err(AppError::Conflict(
                "connection request already processed".into(),
            ));
        }

        let updated = self
            .connections
            .transition(connection_id, user_id, status)
            .await?
            .ok_or_else(|| AppError::Conflict("connection request already processed".into()))?;

        tracing::info!(
            connection_id = %updated.id,
            status = ?updated.status,
            "connection answered"
        );

        if updated.status == ConnectionStatus::Accepted {
            self.presence
                .emit(
                    updated.sender_id,
                    &WsOutboundEvent::ConnectionAccepted {
                        connection: updated.clone(),
                    },
                )
                .await;
            self.notifier
                .notify_best_effort(
                    updated.sender_id,
                    PushNotification::new(
                        "Connection accepted",
                        "Your connection request was accepted",
                    )
                    .with_data(serde_json::json!({
                        "type": "connection_accepted",
                        "connection_id": updated.id,
                    })),
                )
                .await;
        }

        Ok(updated)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<ConnectionStatus>,
    ) -> AppResult<Vec<Connection>> {
        self.connections.list_for_user(user_id, status).await
    }
}
