use super::{EventWithDistance, NearbyUser, SignalWithDistance};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RadarResult {
    pub users: Vec<NearbyUser>,
    pub events: Vec<EventWithDistance>,
    pub signals: Vec<SignalWithDistance>,
}
