use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub starts_at: DateTime<Utc>,
    pub is_boosted: bool,
    pub boosted_at: Option<DateTime<Utc>>,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Boost flag set and not yet expired at `now`
    pub fn is_boost_active(&self, now: DateTime<Utc>) -> bool {
        self.is_boosted && self.boost_expires_at.map(|exp| exp > now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventWithDistance {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub distance: f64,
}
