use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_CONTENT_CHARS: usize = 5000;

/// Direct message. `deleted_for` hides the row per viewer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub signal_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub deleted_for: Vec<Uuid>,
}

impl Message {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    pub fn is_hidden_for(&self, user_id: Uuid) -> bool {
        self.deleted_for.contains(&user_id)
    }

    pub fn counterpart_of(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b) || (self.sender_id == b && self.receiver_id == a)
    }
}

/// Validated insert payload
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub signal_id: Option<Uuid>,
}

/// Client request body for sending a message
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub signal_id: Option<Uuid>,
}

impl SendMessage {
    /// Exactly one of content or media; content trimmed and bounded
    pub fn into_new_message(self, sender_id: Uuid) -> AppResult<NewMessage> {
        let content = self
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let media_url = self
            .media_url
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        match (&content, &media_url) {
            (None, None) => {
                return Err(AppError::Validation(
                    "message needs content or media_url".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "message cannot carry both content and media_url".into(),
                ))
            }
            _ => {}
        }
        if let Some(text) = &content {
            if text.chars().count() > MAX_CONTENT_CHARS {
                return Err(AppError::Validation(format!(
                    "content exceeds {MAX_CONTENT_CHARS} characters"
                )));
            }
        }

        Ok(NewMessage {
            sender_id,
            receiver_id: self.receiver_id,
            content,
            media_url,
            signal_id: self.signal_id,
        })
    }
}
