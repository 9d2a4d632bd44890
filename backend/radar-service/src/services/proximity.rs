use crate::config::RadarConfig;
use crate::error::AppResult;
use crate::geo::RadiusQuery;
use crate::models::{EventWithDistance, NearbyUser, RadarResult};
use crate::repository::{EventRepository, SignalRepository, UserRepository};
use crate::services::notifier::{Notifier, PushNotification};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

/// Composes users, events and signals around a point into one radar view.
///
/// The three reads are independent; a concurrent write may show up in one
/// list and not another.
#[derive(Clone)]
pub struct ProximityService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    signals: Arc<dyn SignalRepository>,
    notifier: Notifier,
    config: RadarConfig,
}

impl ProximityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        signals: Arc<dyn SignalRepository>,
        notifier: Notifier,
        config: RadarConfig,
    ) -> Self {
        Self {
            users,
            events,
            signals,
            notifier,
            config,
        }
    }

    pub fn radius_query(&self, latitude: f64, longitude: f64, radius: f64) -> AppResult<RadiusQuery> {
        RadiusQuery::with_bounds(
            latitude,
            longitude,
            radius,
            self.config.max_radius_meters,
            self.config.result_limit,
        )
    }

    pub async fn get_nearby(
        &self,
        requester_id: Uuid,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> AppResult<RadarResult> {
        let query = self.radius_query(latitude, longitude, radius)?;

        let users = self.nearby_users(requester_id, &query).await?;
        let events = order_events_for_radar(self.events.nearby(&query).await?, Utc::now());
        let signals = self.signals.nearby(&query, requester_id).await?;

        tracing::debug!(
            requester_id = %requester_id,
            radius_m = query.radius_meters,
            users = users.len(),
            events = events.len(),
            signals = signals.len(),
            "radar composed"
        );

        if !users.is_empty() {
            let count = users.len();
            let notification = PushNotification::new(
                "People nearby",
                format!("{count} people are on your radar"),
            )
            .with_data(serde_json::json!({ "type": "radar_detection", "count": count }));
            self.notifier
                .notify_best_effort(requester_id, notification)
                .await;
        }

        Ok(RadarResult {
            users,
            events,
            signals,
        })
    }

    /// Discoverable users around `query`, privacy-projected. No side effects.
    pub async fn nearby_users(
        &self,
        requester_id: Uuid,
        query: &RadiusQuery,
    ) -> AppResult<Vec<NearbyUser>> {
        let rows = self.users.nearby(query, requester_id).await?;
        Ok(rows.into_iter().map(NearbyUser::from).collect())
    }
}

/// Boosted events first (newest boost first); the rest keep distance order.
pub fn order_events_for_radar(
    mut events: Vec<EventWithDistance>,
    now: DateTime<Utc>,
) -> Vec<EventWithDistance> {
    events.sort_by(|a, b| {
        let a_boost = a.event.is_boost_active(now);
        let b_boost = b.event.is_boost_active(now);
        match (a_boost, b_boost) {
            (true, true) => b.event.boosted_at.cmp(&a.event.boosted_at),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use chrono::Duration;

    fn event(title: &str, distance: f64, boosted_at: Option<DateTime<Utc>>) -> EventWithDistance {
        let now = Utc::now();
        EventWithDistance {
            event: Event {
                id: Uuid::new_v4(),
                organizer_id: Uuid::new_v4(),
                title: title.to_string(),
                description: None,
                latitude: 0.0,
                longitude: 0.0,
                starts_at: now,
                is_boosted: boosted_at.is_some(),
                boosted_at,
                boost_expires_at: boosted_at.map(|_| now + Duration::hours(1)),
                created_at: now,
            },
            distance,
        }
    }

    #[test]
    fn boosted_events_lead_and_rest_keep_distance_order() {
        let now = Utc::now();
        let events = vec![
            event("near", 10.0, None),
            event("old-boost", 20.0, Some(now - Duration::hours(2))),
            event("mid", 30.0, None),
            event("new-boost", 40.0, Some(now - Duration::minutes(5))),
            event("far", 50.0, None),
        ];

        let ordered: Vec<String> = order_events_for_radar(events, now)
            .into_iter()
            .map(|e| e.event.title)
            .collect();
        assert_eq!(ordered, vec!["new-boost", "old-boost", "near", "mid", "far"]);
    }

    #[test]
    fn expired_boost_is_ordinary() {
        let now = Utc::now();
        let mut expired = event("expired", 20.0, Some(now - Duration::days(2)));
        expired.event.boost_expires_at = Some(now - Duration::days(1));
        let events = vec![event("near", 10.0, None), expired];

        let ordered: Vec<String> = order_events_for_radar(events, now)
            .into_iter()
            .map(|e| e.event.title)
            .collect();
        assert_eq!(ordered, vec!["near", "expired"]);
    }
}
