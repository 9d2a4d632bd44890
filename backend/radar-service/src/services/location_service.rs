use crate::error::{AppError, AppResult, Resource};
use crate::geo::GeoPoint;
use crate::models::User;
use crate::repository::UserRepository;
use crate::websocket::{PresenceRegistry, WsOutboundEvent};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocationService {
    users: Arc<dyn UserRepository>,
    presence: PresenceRegistry,
}

impl LocationService {
    pub fn new(users: Arc<dyn UserRepository>, presence: PresenceRegistry) -> Self {
        Self { users, presence }
    }

    /// Store the user's position and echo it to their own sessions
    pub async fn update_location(
        &self,
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<User> {
        let point = GeoPoint::new(latitude, longitude)?;
        let user = self
            .users
            .update_location(user_id, point)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;
        self.echo_location(user_id, point).await;
        Ok(user)
    }

    /// Relay a live position to the user's own channel without storing it
    pub async fn echo_location(&self, user_id: Uuid, point: GeoPoint) {
        self.presence
            .emit(
                user_id,
                &WsOutboundEvent::LocationUpdate {
                    user_id,
                    latitude: point.latitude,
                    longitude: point.longitude,
                },
            )
            .await;
    }

    pub async fn set_visibility(
        &self,
        user_id: Uuid,
        is_visible: Option<bool>,
        invisible_mode: Option<bool>,
    ) -> AppResult<User> {
        if is_visible.is_none() && invisible_mode.is_none() {
            return Err(AppError::Validation(
                "provide is_visible or invisible_mode".into(),
            ));
        }
        let user = self
            .users
            .update_visibility(user_id, is_visible, invisible_mode)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;
        tracing::info!(
            user_id = %user_id,
            is_visible = user.is_visible,
            invisible_mode = user.invisible_mode,
            "visibility changed"
        );
        Ok(user)
    }
}
