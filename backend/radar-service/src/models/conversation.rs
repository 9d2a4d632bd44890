use super::{Message, UserSummary};
use serde::Serialize;
use uuid::Uuid;

/// One row per counterpart in a user's inbox
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    /// `None` when the counterpart account no longer exists
    pub counterpart: Option<UserSummary>,
    pub last_message: Message,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentConversations {
    pub conversations: Vec<ConversationSummary>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}
