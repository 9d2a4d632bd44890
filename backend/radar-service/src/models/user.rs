use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PLAN_FREE: &str = "free";
pub const PLAN_PREMIUM: &str = "premium";

/// Profile columns this service reads. Credentials and verification tokens
/// live in columns that are never selected here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
    pub is_visible: bool,
    pub invisible_mode: bool,
    pub is_verified: bool,
    pub show_age: bool,
    pub show_location: bool,
    pub plan: String,
    #[serde(skip_serializing)]
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Minimal visible, verified profile without a position.
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            avatar_url: None,
            bio: None,
            age: None,
            latitude: None,
            longitude: None,
            location_updated_at: None,
            is_visible: true,
            invisible_mode: false,
            is_verified: true,
            show_age: true,
            show_location: true,
            plan: PLAN_FREE.to_string(),
            device_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_columns(self.latitude, self.longitude)
    }

    /// Visible to others on radar (ignores verification)
    pub fn is_visible_on_radar(&self) -> bool {
        self.is_visible && !self.invisible_mode
    }

    /// Eligible to appear in another user's nearby list
    pub fn is_discoverable(&self) -> bool {
        self.is_verified && self.is_visible_on_radar() && self.position().is_some()
    }

    pub fn is_premium(&self) -> bool {
        self.plan == PLAN_PREMIUM
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            is_verified: self.is_verified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithDistance {
    #[sqlx(flatten)]
    pub user: User,
    pub distance: f64,
}

/// Public projection of a user on radar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyUser {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: bool,
    pub distance: f64,
}

impl From<UserWithDistance> for NearbyUser {
    fn from(row: UserWithDistance) -> Self {
        let UserWithDistance { user, distance } = row;
        let (latitude, longitude) = if user.show_location {
            (user.latitude, user.longitude)
        } else {
            (None, None)
        };
        Self {
            id: user.id,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            age: if user.show_age { user.age } else { None },
            latitude,
            longitude,
            is_verified: user.is_verified,
            distance,
        }
    }
}
