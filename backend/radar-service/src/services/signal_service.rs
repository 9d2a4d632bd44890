use crate::error::{AppError, AppResult, Resource};
use crate::models::signal::MAX_NOTE_CHARS;
use crate::models::{NewSignal, Signal};
use crate::repository::{SignalRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SignalService {
    users: Arc<dyn UserRepository>,
    signals: Arc<dyn SignalRepository>,
}

impl SignalService {
    pub fn new(users: Arc<dyn UserRepository>, signals: Arc<dyn SignalRepository>) -> Self {
        Self { users, signals }
    }

    pub async fn create(&self, sender_id: Uuid, request: NewSignal) -> AppResult<Signal> {
        let note = request
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(note) = &note {
            if note.chars().count() > MAX_NOTE_CHARS {
                return Err(AppError::Validation(format!(
                    "note exceeds {MAX_NOTE_CHARS} characters"
                )));
            }
        }

        if self.users.find_by_id(sender_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        let signal = Signal {
            id: Uuid::new_v4(),
            sender_id,
            note,
            created_at: Utc::now(),
        };
        let signal = self.signals.insert(&signal).await?;
        tracing::info!(signal_id = %signal.id, sender_id = %sender_id, "signal created");
        Ok(signal)
    }
}
