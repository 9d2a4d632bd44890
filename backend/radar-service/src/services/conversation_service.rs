use crate::error::{AppError, AppResult};
use crate::models::{ConversationSummary, Message, RecentConversations};
use crate::repository::{MessageRepository, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct ConversationService {
    users: Arc<dyn UserRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl ConversationService {
    pub fn new(users: Arc<dyn UserRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { users, messages }
    }

    /// One entry per counterpart, most recent conversation first
    pub async fn recent_conversations(
        &self,
        user_id: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
        all: bool,
    ) -> AppResult<RecentConversations> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::Validation("page starts at 1".into()));
        }
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err(AppError::Validation("limit must be positive".into()));
        }
        let limit = limit.min(MAX_PAGE_SIZE);

        // newest first, already filtered for this viewer
        let messages = self.messages.list_for_user(user_id).await?;
        let threads = group_by_counterpart(user_id, messages);
        let total = threads.len();

        let selected: Vec<(Uuid, Message, i64)> = if all {
            threads
        } else {
            let skip = (page as usize - 1) * limit as usize;
            threads.into_iter().skip(skip).take(limit as usize).collect()
        };

        let ids: Vec<Uuid> = selected.iter().map(|(id, _, _)| *id).collect();
        let mut summaries: HashMap<Uuid, _> = self
            .users
            .find_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let conversations = selected
            .into_iter()
            .map(|(counterpart_id, last_message, unread_count)| ConversationSummary {
                counterpart_id,
                counterpart: summaries.remove(&counterpart_id),
                last_message,
                unread_count,
            })
            .collect();

        let (page, limit) = if all {
            (1, u32::try_from(total).unwrap_or(u32::MAX))
        } else {
            (page, limit)
        };

        Ok(RecentConversations {
            conversations,
            total,
            page,
            limit,
        })
    }
}

/// Walk newest-first messages once: the first message seen per counterpart
/// is the last message of that thread.
fn group_by_counterpart(user_id: Uuid, messages: Vec<Message>) -> Vec<(Uuid, Message, i64)> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut threads: HashMap<Uuid, (Message, i64)> = HashMap::new();

    for message in messages {
        let counterpart = message.counterpart_of(user_id);
        let unread = i64::from(message.receiver_id == user_id && !message.is_read);
        match threads.get_mut(&counterpart) {
            Some((_, count)) => *count += unread,
            None => {
                order.push(counterpart);
                threads.insert(counterpart, (message, unread));
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| threads.remove(&id).map(|(last, unread)| (id, last, unread)))
        .collect()
}
