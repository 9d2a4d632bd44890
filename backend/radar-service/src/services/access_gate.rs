use crate::error::{AppError, AppResult, Denial, Resource};
use crate::geo::RadiusQuery;
use crate::repository::{ConnectionRepository, SignalRepository, UserRepository};
use crate::services::proximity::ProximityService;
use std::sync::Arc;
use uuid::Uuid;

/// Decides whether `sender` may message `receiver`.
///
/// Two routes open a thread: an accepted connection in either direction, or a
/// reply to a signal while the receiver is inside the sender's reply radius.
#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UserRepository>,
    connections: Arc<dyn ConnectionRepository>,
    signals: Arc<dyn SignalRepository>,
    proximity: ProximityService,
    reply_radius_meters: f64,
}

impl AccessGate {
    pub fn new(
        users: Arc<dyn UserRepository>,
        connections: Arc<dyn ConnectionRepository>,
        signals: Arc<dyn SignalRepository>,
        proximity: ProximityService,
        reply_radius_meters: f64,
    ) -> Self {
        Self {
            users,
            connections,
            signals,
            proximity,
            reply_radius_meters,
        }
    }

    /// Accepted connection in either direction
    pub async fn is_connected(&self, a: Uuid, b: Uuid) -> AppResult<bool> {
        self.connections.has_accepted_between(a, b).await
    }

    pub async fn can_send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        signal_id: Option<Uuid>,
    ) -> AppResult<()> {
        if sender_id == receiver_id {
            return Err(AppError::Forbidden(Denial::InvalidTarget));
        }

        let Some(signal_id) = signal_id else {
            return if self.is_connected(sender_id, receiver_id).await? {
                Ok(())
            } else {
                Err(AppError::Forbidden(Denial::NotConnected))
            };
        };

        let sender = self
            .users
            .find_by_id(sender_id)
            .await?
            .ok_or(AppError::NotFound(Resource::User))?;
        if !sender.is_visible_on_radar() {
            return Err(AppError::Forbidden(Denial::InvisibleSender));
        }
        let position = sender
            .position()
            .ok_or(AppError::Forbidden(Denial::LocationUnavailable))?;

        if self.signals.find_by_id(signal_id).await?.is_none() {
            return Err(AppError::NotFound(Resource::Signal));
        }

        // membership check: no row cap
        let query = RadiusQuery::with_bounds(
            position.latitude,
            position.longitude,
            self.reply_radius_meters,
            self.reply_radius_meters,
            i64::MAX,
        )?;
        let nearby = self.proximity.nearby_users(sender_id, &query).await?;
        if nearby.iter().any(|u| u.id == receiver_id) {
            Ok(())
        } else {
            tracing::debug!(
                sender_id = %sender_id,
                receiver_id = %receiver_id,
                signal_id = %signal_id,
                "signal reply rejected: receiver out of range"
            );
            Err(AppError::Forbidden(Denial::SignalNotInRange))
        }
    }
}
