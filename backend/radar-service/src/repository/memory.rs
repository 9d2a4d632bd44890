//! Process-local store implementing every repository trait.
//!
//! Used when `DATABASE_URL` is unset and by the test suite. Distances use the
//! haversine formula. Each mutation runs under a single write lock, which
//! gives the same all-or-nothing behaviour as the single-statement SQL.

use crate::error::{AppError, AppResult};
use crate::geo::{rank_by_distance, GeoPoint, RadiusQuery};
use crate::models::{
    Connection, ConnectionStatus, Event, EventWithDistance, Message, NewMessage, Signal,
    SignalWithDistance, User, UserSummary, UserWithDistance,
};
use crate::repository::{
    ConnectionRepository, EventRepository, MessageRepository, SignalRepository, UserRepository,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    connections: Vec<Connection>,
    signals: Vec<Signal>,
    events: Vec<Event>,
    // insertion order == created_at order
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a profile. Account creation is owned elsewhere; this is the
    /// seeding path for local runs and tests.
    pub async fn put_user(&self, user: User) -> User {
        let mut tables = self.inner.write().await;
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>> {
        let tables = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(User::summary)
            .collect())
    }

    async fn nearby(&self, query: &RadiusQuery, exclude: Uuid) -> AppResult<Vec<UserWithDistance>> {
        let tables = self.inner.read().await;
        let hits: Vec<(User, f64)> = tables
            .users
            .values()
            .filter(|u| u.id != exclude && u.is_discoverable())
            .filter_map(|u| {
                let position = u.position()?;
                query
                    .distance_if_within(&position)
                    .map(|distance| (u.clone(), distance))
            })
            .collect();

        Ok(rank_by_distance(hits, query.limit)
            .into_iter()
            .map(|(user, distance)| UserWithDistance { user, distance })
            .collect())
    }

    async fn update_location(&self, id: Uuid, point: GeoPoint) -> AppResult<Option<User>> {
        let mut tables = self.inner.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.latitude = Some(point.latitude);
            user.longitude = Some(point.longitude);
            user.location_updated_at = Some(Utc::now());
            user.clone()
        }))
    }

    async fn update_visibility(
        &self,
        id: Uuid,
        is_visible: Option<bool>,
        invisible_mode: Option<bool>,
    ) -> AppResult<Option<User>> {
        let mut tables = self.inner.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            if let Some(flag) = is_visible {
                user.is_visible = flag;
            }
            if let Some(flag) = invisible_mode {
                user.invisible_mode = flag;
            }
            user.clone()
        }))
    }
}

#[async_trait::async_trait]
impl ConnectionRepository for InMemoryStore {
    async fn insert(&self, connection: &Connection) -> AppResult<Connection> {
        let mut tables = self.inner.write().await;
        if tables
            .connections
            .iter()
            .any(|c| c.involves(connection.sender_id, connection.receiver_id))
        {
            return Err(AppError::Conflict(
                "a connection between these users already exists".into(),
            ));
        }
        tables.connections.push(connection.clone());
        Ok(connection.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>> {
        let tables = self.inner.read().await;
        Ok(tables.connections.iter().find(|c| c.id == id).cloned())
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Connection>> {
        let tables = self.inner.read().await;
        Ok(tables.connections.iter().find(|c| c.involves(a, b)).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> AppResult<Option<Connection>> {
        let mut tables = self.inner.write().await;
        Ok(tables
            .connections
            .iter_mut()
            .find(|c| {
                c.id == id && c.receiver_id == receiver_id && c.status == ConnectionStatus::Pending
            })
            .map(|c| {
                c.status = status;
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConnectionStatus>,
    ) -> AppResult<Vec<Connection>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<Connection> = tables
            .connections
            .iter()
            .filter(|c| c.sender_id == user_id || c.receiver_id == user_id)
            .filter(|c| status.map(|s| c.status == s).unwrap_or(true))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn count_sent_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let tables = self.inner.read().await;
        let count = tables
            .connections
            .iter()
            .filter(|c| c.sender_id == user_id && c.created_at >= since)
            .count();
        Ok(count as i64)
    }

    async fn has_accepted_between(&self, a: Uuid, b: Uuid) -> AppResult<bool> {
        let tables = self.inner.read().await;
        Ok(tables
            .connections
            .iter()
            .any(|c| c.status == ConnectionStatus::Accepted && c.involves(a, b)))
    }
}

#[async_trait::async_trait]
impl SignalRepository for InMemoryStore {
    async fn insert(&self, signal: &Signal) -> AppResult<Signal> {
        let mut tables = self.inner.write().await;
        tables.signals.push(signal.clone());
        Ok(signal.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Signal>> {
        let tables = self.inner.read().await;
        Ok(tables.signals.iter().find(|s| s.id == id).cloned())
    }

    async fn nearby(
        &self,
        query: &RadiusQuery,
        exclude_sender: Uuid,
    ) -> AppResult<Vec<SignalWithDistance>> {
        let tables = self.inner.read().await;
        let mut hits: Vec<(SignalWithDistance, f64)> = tables
            .signals
            .iter()
            .filter(|s| s.sender_id != exclude_sender)
            .filter_map(|s| {
                let sender = tables.users.get(&s.sender_id)?;
                if !sender.is_visible_on_radar() {
                    return None;
                }
                let distance = query.distance_if_within(&sender.position()?)?;
                Some((
                    SignalWithDistance {
                        signal: s.clone(),
                        sender_display_name: sender.display_name.clone(),
                        sender_avatar_url: sender.avatar_url.clone(),
                        distance,
                    },
                    distance,
                ))
            })
            .collect();
        // newest first among equal distances
        hits.sort_by(|a, b| b.0.signal.created_at.cmp(&a.0.signal.created_at));

        Ok(rank_by_distance(hits, query.limit)
            .into_iter()
            .map(|(row, _)| row)
            .collect())
    }
}

#[async_trait::async_trait]
impl EventRepository for InMemoryStore {
    async fn insert(&self, event: &Event) -> AppResult<Event> {
        let mut tables = self.inner.write().await;
        tables.events.push(event.clone());
        Ok(event.clone())
    }

    async fn nearby(&self, query: &RadiusQuery) -> AppResult<Vec<EventWithDistance>> {
        let tables = self.inner.read().await;
        let hits: Vec<(Event, f64)> = tables
            .events
            .iter()
            .filter_map(|e| {
                let position = GeoPoint::from_columns(Some(e.latitude), Some(e.longitude))?;
                query
                    .distance_if_within(&position)
                    .map(|distance| (e.clone(), distance))
            })
            .collect();

        Ok(rank_by_distance(hits, query.limit)
            .into_iter()
            .map(|(event, distance)| EventWithDistance { event, distance })
            .collect())
    }
}

#[async_trait::async_trait]
impl MessageRepository for InMemoryStore {
    async fn insert(&self, message: NewMessage) -> AppResult<Message> {
        let mut tables = self.inner.write().await;
        let mut created_at = Utc::now();
        if let Some(last) = tables.messages.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }
        let row = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            media_url: message.media_url,
            signal_id: message.signal_id,
            is_read: false,
            created_at,
            deleted_for: Vec::new(),
        };
        tables.messages.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>> {
        let tables = self.inner.read().await;
        Ok(tables.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_between(&self, viewer: Uuid, other: Uuid) -> AppResult<Vec<Message>> {
        let tables = self.inner.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.between(viewer, other) && !m.is_hidden_for(viewer))
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        let tables = self.inner.read().await;
        Ok(tables
            .messages
            .iter()
            .rev()
            .filter(|m| m.is_participant(user_id) && !m.is_hidden_for(user_id))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let mut tables = self.inner.write().await;
        let mut changed = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.receiver_id == user_id && !m.is_read && ids.contains(&m.id))
        {
            message.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let tables = self.inner.read().await;
        let count = tables
            .messages
            .iter()
            .filter(|m| m.receiver_id == user_id && !m.is_read && !m.is_hidden_for(user_id))
            .count();
        Ok(count as i64)
    }

    async fn delete_for_user(&self, message_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.write().await;
        match tables.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) if !message.is_hidden_for(user_id) => {
                message.deleted_for.push(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_conversation(&self, user_id: Uuid, other: Uuid) -> AppResult<u64> {
        let mut tables = self.inner.write().await;
        let mut hidden = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.between(user_id, other) && !m.is_hidden_for(user_id))
        {
            message.deleted_for.push(user_id);
            hidden += 1;
        }
        Ok(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(sender: Uuid, receiver: Uuid, body: &str) -> NewMessage {
        NewMessage {
            sender_id: sender,
            receiver_id: receiver,
            content: Some(body.to_string()),
            media_url: None,
            signal_id: None,
        }
    }

    #[tokio::test]
    async fn delete_for_user_is_idempotent() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = MessageRepository::insert(&store, text(a, b, "hi")).await.unwrap();

        assert!(store.delete_for_user(msg.id, a).await.unwrap());
        assert!(!store.delete_for_user(msg.id, a).await.unwrap());

        let row = MessageRepository::find_by_id(&store, msg.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.deleted_for, vec![a]);
    }

    #[tokio::test]
    async fn message_timestamps_are_strictly_increasing() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        for i in 0..5 {
            MessageRepository::insert(&store, text(a, b, &format!("m{i}")))
                .await
                .unwrap();
        }
        let thread = store.list_between(a, b).await.unwrap();
        assert!(thread
            .windows(2)
            .all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn duplicate_pair_conflicts_in_either_direction() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        ConnectionRepository::insert(&store, &Connection::new_pending(a, b))
            .await
            .unwrap();
        let err = ConnectionRepository::insert(&store, &Connection::new_pending(b, a))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
