use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_NOTE_CHARS: usize = 280;

/// Untargeted "I'm here" broadcast; immutable once stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Signal {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSignal {
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SignalWithDistance {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub signal: Signal,
    pub sender_display_name: String,
    pub sender_avatar_url: Option<String>,
    pub distance: f64,
}
