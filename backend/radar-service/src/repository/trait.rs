use crate::error::AppResult;
use crate::geo::{GeoPoint, RadiusQuery};
use crate::models::{
    Connection, ConnectionStatus, Event, EventWithDistance, Message, NewMessage, Signal,
    SignalWithDistance, User, UserSummary, UserWithDistance,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read access to user profiles plus the two mutations this service owns.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Summaries for the given ids; unknown ids are skipped
    async fn find_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>>;

    /// Discoverable users inside the radius, nearest first, excluding `exclude`
    async fn nearby(&self, query: &RadiusQuery, exclude: Uuid) -> AppResult<Vec<UserWithDistance>>;

    /// Store a new position. Returns `None` for an unknown user.
    async fn update_location(&self, id: Uuid, point: GeoPoint) -> AppResult<Option<User>>;

    /// Toggle visibility flags; `None` leaves a flag unchanged
    async fn update_visibility(
        &self,
        id: Uuid,
        is_visible: Option<bool>,
        invisible_mode: Option<bool>,
    ) -> AppResult<Option<User>>;
}

#[async_trait::async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Insert a pending request. A second row for the same unordered pair
    /// fails with `Conflict`.
    async fn insert(&self, connection: &Connection) -> AppResult<Connection>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Connection>>;

    /// The row for the unordered pair, whichever direction it was sent
    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Connection>>;

    /// Conditionally move a pending request addressed to `receiver_id` to
    /// `status`. Returns `None` when no pending row matched.
    async fn transition(
        &self,
        id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> AppResult<Option<Connection>>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConnectionStatus>,
    ) -> AppResult<Vec<Connection>>;

    /// Requests sent by `user_id` at or after `since`
    async fn count_sent_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64>;

    async fn has_accepted_between(&self, a: Uuid, b: Uuid) -> AppResult<bool>;
}

#[async_trait::async_trait]
pub trait SignalRepository: Send + Sync {
    async fn insert(&self, signal: &Signal) -> AppResult<Signal>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Signal>>;

    /// Signals whose sender is visible, positioned and inside the radius.
    /// Distance is measured from the sender's live position.
    async fn nearby(
        &self,
        query: &RadiusQuery,
        exclude_sender: Uuid,
    ) -> AppResult<Vec<SignalWithDistance>>;
}

#[async_trait::async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &Event) -> AppResult<Event>;

    /// Nearest events inside the radius, ascending by distance
    async fn nearby(&self, query: &RadiusQuery) -> AppResult<Vec<EventWithDistance>>;
}

#[async_trait::async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: NewMessage) -> AppResult<Message>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>>;

    /// Thread between `viewer` and `other` not hidden for `viewer`, oldest first
    async fn list_between(&self, viewer: Uuid, other: Uuid) -> AppResult<Vec<Message>>;

    /// Every message involving `user_id` not hidden for them, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Message>>;

    /// Mark messages addressed to `user_id` as read; returns rows changed
    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64>;

    /// Add `user_id` to `deleted_for` if absent; returns whether a row changed
    async fn delete_for_user(&self, message_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Hide every message in the thread currently visible to `user_id`
    async fn delete_conversation(&self, user_id: Uuid, other: Uuid) -> AppResult<u64>;
}
