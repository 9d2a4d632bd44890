/// Geodesic primitives for radar queries.
///
/// Positions use WGS84 degrees. Distances are in meters.
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub mod predicate;

pub use predicate::GeoPredicate;

/// Mean Earth radius (IUGG), meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Hard ceiling on radius queries, meters
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

/// Rows returned per radius query
pub const DEFAULT_RESULT_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AppError::InvalidCoordinates);
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a point from nullable stored columns
    pub fn from_columns(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Great-circle distance using the haversine formula (meters)
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

/// A validated "everything within `radius_meters` of `center`" request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub limit: i64,
}

impl RadiusQuery {
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> AppResult<Self> {
        Self::with_bounds(
            latitude,
            longitude,
            radius_meters,
            MAX_RADIUS_METERS,
            DEFAULT_RESULT_LIMIT,
        )
    }

    pub fn with_bounds(
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        max_radius_meters: f64,
        limit: i64,
    ) -> AppResult<Self> {
        let center = GeoPoint::new(latitude, longitude)?;
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(AppError::Validation("radius must be greater than 0".into()));
        }
        if radius_meters > max_radius_meters {
            return Err(AppError::Validation(format!(
                "radius must not exceed {max_radius_meters} meters"
            )));
        }
        Ok(Self {
            center,
            radius_meters,
            limit: limit.max(1),
        })
    }

    /// Distance from the query center when `point` is inside the radius
    pub fn distance_if_within(&self, point: &GeoPoint) -> Option<f64> {
        let distance = self.center.distance_to(point);
        (distance <= self.radius_meters).then_some(distance)
    }
}

/// Sorts ascending by distance and applies the row cap
pub fn rank_by_distance<T>(mut rows: Vec<(T, f64)>, limit: i64) -> Vec<(T, f64)> {
    rows.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(usize::try_from(limit).unwrap_or(0));
    rows
}
