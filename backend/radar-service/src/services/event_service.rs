use crate::error::{AppError, AppResult, Resource};
use crate::geo::GeoPoint;
use crate::models::{Event, NewEvent};
use crate::repository::{EventRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_TITLE_CHARS: usize = 200;

#[derive(Clone)]
pub struct EventService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(users: Arc<dyn UserRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self { users, events }
    }

    pub async fn create(&self, organizer_id: Uuid, request: NewEvent) -> AppResult<Event> {
        let position = GeoPoint::new(request.latitude, request.longitude)?;
        let title = request.title.trim().to_string();
        if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::Validation(format!(
                "title must be 1-{MAX_TITLE_CHARS} characters"
            )));
        }

        if self.users.find_by_id(organizer_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::User));
        }

        // boosting is a paid flow handled elsewhere
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id,
            title,
            description: request.description.filter(|d| !d.trim().is_empty()),
            latitude: position.latitude,
            longitude: position.longitude,
            starts_at: request.starts_at,
            is_boosted: false,
            boosted_at: None,
            boost_expires_at: None,
            created_at: Utc::now(),
        };
        self.events.insert(&event).await
    }
}
