use crate::error::{AppError, AppResult, Denial, Resource};
use crate::models::{Message, SendMessage};
use crate::repository::{MessageRepository, UserRepository};
use crate::services::access_gate::AccessGate;
use crate::services::notifier::{Notifier, PushNotification};
use crate::websocket::{PresenceRegistry, WsOutboundEvent};
use std::sync::Arc;
use uuid::Uuid;

const PUSH_PREVIEW_CHARS: usize = 80;

/// Conversation store adapter: persistence, per-viewer soft delete and
/// realtime fan-out of direct messages.
#[derive(Clone)]
pub struct MessageService {
    users: Arc<dyn UserRepository>,
    messages: Arc<dyn MessageRepository>,
    gate: AccessGate,
    presence: PresenceRegistry,
    notifier: Notifier,
}

impl MessageService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn MessageRepository>,
        gate: AccessGate,
        presence: PresenceRegistry,
        notifier: Notifier,
    ) -> Self {
        Self {
            users,
            messages,
            gate,
            presence,
            notifier,
        }
    }

    pub async fn send(&self, sender_id: Uuid, request: SendMessage) -> AppResult<Message> {
        let new_message = request.into_new_message(sender_id)?;
        let receiver_id = new_message.receiver_id;

        if self.users.find_by_id(receiver_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }
        self.gate
            .can_send(sender_id, receiver_id, new_message.signal_id)
            .await?;

        let message = self.messages.insert(new_message).await?;
        tracing::debug!(
            message_id = %message.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            "message stored"
        );

        let event = WsOutboundEvent::NewMessage {
            message: message.clone(),
        };
        self.presence.emit(receiver_id, &event).await;
        self.presence.emit(sender_id, &event).await;

        let title = match self.users.find_by_id(sender_id).await {
            Ok(Some(sender)) => sender.display_name,
            _ => "New message".to_string(),
        };
        let body = match &message.content {
            Some(text) => text.chars().take(PUSH_PREVIEW_CHARS).collect(),
            None => "Sent an attachment".to_string(),
        };
        self.notifier
            .notify_best_effort(
                receiver_id,
                PushNotification::new(title, body).with_data(serde_json::json!({
                    "type": "new_message",
                    "message_id": message.id,
                    "sender_id": sender_id,
                })),
            )
            .await;

        Ok(message)
    }

    /// Relay a typing indicator to `receiver_id`. Dropped unless the pair is
    /// connected or already shares a visible thread. Returns whether it was sent.
    pub async fn relay_typing(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        typing: bool,
    ) -> AppResult<bool> {
        if sender_id == receiver_id {
            return Ok(false);
        }
        let allowed = self.gate.is_connected(sender_id, receiver_id).await?
            || !self
                .messages
                .list_between(sender_id, receiver_id)
                .await?
                .is_empty();
        if !allowed {
            tracing::debug!(
                sender_id = %sender_id,
                receiver_id = %receiver_id,
                "typing indicator dropped: no relationship"
            );
            return Ok(false);
        }

        let event = if typing {
            WsOutboundEvent::Typing { sender_id }
        } else {
            WsOutboundEvent::StopTyping { sender_id }
        };
        self.presence.emit(receiver_id, &event).await;
        Ok(true)
    }

    pub async fn list_between(&self, viewer: Uuid, other: Uuid) -> AppResult<Vec<Message>> {
        self.messages.list_between(viewer, other).await
    }

    pub async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        self.messages.mark_read(user_id, ids).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.messages.unread_count(user_id).await
    }

    /// Hide one message for `user_id` only
    pub async fn delete_for_user(&self, user_id: Uuid, message_id: Uuid) -> AppResult<()> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Message))?;
        if !message.is_participant(user_id) {
            return Err(AppError::Forbidden(Denial::NotParticipant));
        }
        self.messages.delete_for_user(message_id, user_id).await?;
        Ok(())
    }

    /// Hide the whole thread with `other` for `user_id`. Messages sent
    /// afterwards are visible again.
    pub async fn delete_conversation(&self, user_id: Uuid, other: Uuid) -> AppResult<u64> {
        if user_id == other {
            return Err(AppError::Forbidden(Denial::InvalidTarget));
        }
        let hidden = self.messages.delete_conversation(user_id, other).await?;
        tracing::info!(user_id = %user_id, other = %other, hidden, "conversation hidden");
        Ok(hidden)
    }
}
