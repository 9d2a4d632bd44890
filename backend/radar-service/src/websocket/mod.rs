use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod message_types;

pub use message_types::{WsInboundEvent, WsOutboundEvent};

/// Unique identifier for one WebSocket session of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

struct Session {
    id: SessionId,
    sender: UnboundedSender<String>,
}

/// Presence registry: which users are online and on which sessions.
///
/// A user may hold several sessions (phone + web). Events addressed to the
/// user are delivered to every live session. Built once at startup and
/// shared through `AppState`.
#[derive(Default, Clone)]
pub struct PresenceRegistry {
    // user_id -> live sessions
    inner: Arc<RwLock<HashMap<Uuid, Vec<Session>>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session on the user's channel
    pub async fn register(&self, user_id: Uuid) -> (SessionId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let session_id = SessionId::new();

        let mut guard = self.inner.write().await;
        guard.entry(user_id).or_default().push(Session {
            id: session_id,
            sender: tx,
        });

        tracing::debug!(
            user_id = %user_id,
            sessions = guard.get(&user_id).map(|v| v.len()).unwrap_or(0),
            "presence session registered"
        );

        (session_id, rx)
    }

    /// Remove exactly one session; the user's entry goes when it empties
    pub async fn unregister(&self, user_id: Uuid, session_id: SessionId) {
        let mut guard = self.inner.write().await;

        if let Some(sessions) = guard.get_mut(&user_id) {
            sessions.retain(|s| s.id != session_id);
            if sessions.is_empty() {
                guard.remove(&user_id);
                tracing::debug!(user_id = %user_id, "user went offline");
            }
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.inner.read().await.contains_key(&user_id)
    }

    pub async fn session_count(&self, user_id: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&user_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Deliver an event to every session of `user_id`.
    ///
    /// Returns the number of sessions reached; 0 means the user is offline
    /// and the event was dropped. Dead senders are pruned on the way.
    pub async fn emit(&self, user_id: Uuid, event: &WsOutboundEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound event");
                return 0;
            }
        };

        let mut guard = self.inner.write().await;
        let Some(sessions) = guard.get_mut(&user_id) else {
            return 0;
        };

        sessions.retain(|s| s.sender.send(payload.clone()).is_ok());
        let delivered = sessions.len();
        if sessions.is_empty() {
            guard.remove(&user_id);
        }
        delivered
    }

    /// Deliver an event to a single session only
    pub async fn emit_to_session(
        &self,
        user_id: Uuid,
        session_id: SessionId,
        event: &WsOutboundEvent,
    ) -> bool {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound event");
                return false;
            }
        };

        let guard = self.inner.read().await;
        guard
            .get(&user_id)
            .and_then(|sessions| sessions.iter().find(|s| s.id == session_id))
            .map(|s| s.sender.send(payload).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unregister_removes_only_that_session() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (s1, _rx1) = registry.register(user).await;
        let (_s2, mut rx2) = registry.register(user).await;

        registry.unregister(user, s1).await;
        assert_eq!(registry.session_count(user).await, 1);

        let delivered = registry
            .emit(user, &WsOutboundEvent::Typing { sender_id: user })
            .await;
        assert_eq!(delivered, 1);
        assert!(rx2.recv().await.unwrap().contains("\"typing\""));
    }

    #[tokio::test]
    async fn empty_entries_are_pruned() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (s1, _rx) = registry.register(user).await;
        registry.unregister(user, s1).await;
        assert!(!registry.is_online(user).await);
    }

    #[tokio::test]
    async fn emit_to_offline_user_is_dropped() {
        let registry = PresenceRegistry::new();
        let delivered = registry
            .emit(
                Uuid::new_v4(),
                &WsOutboundEvent::StopTyping {
                    sender_id: Uuid::new_v4(),
                },
            )
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn dead_sessions_are_cleaned_on_emit() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (_s1, rx) = registry.register(user).await;
        drop(rx);
        let delivered = registry
            .emit(user, &WsOutboundEvent::Typing { sender_id: user })
            .await;
        assert_eq!(delivered, 0);
        assert!(!registry.is_online(user).await);
    }
}
