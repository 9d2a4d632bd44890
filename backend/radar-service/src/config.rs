use crate::error::AppError;
use crate::geo::MAX_RADIUS_METERS;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// Hard ceiling on any radius query, in meters
    pub max_radius_meters: f64,
    /// Maximum rows returned per entity list
    pub result_limit: i64,
    /// Radius used when checking a signal reply, in meters
    pub signal_reply_radius_meters: f64,
}

impl RadarConfig {
    /// Radii must stay inside the hard query ceiling
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.max_radius_meters > 0.0 && self.max_radius_meters <= MAX_RADIUS_METERS) {
            return Err(AppError::Config(format!(
                "RADAR_MAX_RADIUS_METERS must be in (0, {MAX_RADIUS_METERS}]"
            )));
        }
        if !(self.signal_reply_radius_meters > 0.0
            && self.signal_reply_radius_meters <= self.max_radius_meters)
        {
            return Err(AppError::Config(
                "SIGNAL_REPLY_RADIUS_METERS must be positive and cannot exceed RADAR_MAX_RADIUS_METERS"
                    .into(),
            ));
        }
        if self.result_limit <= 0 {
            return Err(AppError::Config("RADAR_RESULT_LIMIT must be positive".into()));
        }
        Ok(())
    }
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            max_radius_meters: MAX_RADIUS_METERS,
            result_limit: 50,
            signal_reply_radius_meters: 5_000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Connection requests a free-plan user may send per rolling 24h
    pub free_daily_connection_requests: i64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_daily_connection_requests: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub push_gateway_url: Option<String>,
    pub radar: RadarConfig,
    pub limits: LimitsConfig,
}

impl Config {
    fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
        match env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{key} is not a valid value: {raw}"))),
            _ => Ok(default),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let db_max_connections = Self::parse_var("DB_MAX_CONNECTIONS", 20u32)?;
        let port = Self::parse_var("PORT", 8080u16)?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        if jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 bytes".into(),
            ));
        }

        let push_gateway_url = env::var("PUSH_GATEWAY_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let defaults = RadarConfig::default();
        let radar = RadarConfig {
            max_radius_meters: Self::parse_var(
                "RADAR_MAX_RADIUS_METERS",
                defaults.max_radius_meters,
            )?,
            result_limit: Self::parse_var("RADAR_RESULT_LIMIT", defaults.result_limit)?,
            signal_reply_radius_meters: Self::parse_var(
                "SIGNAL_REPLY_RADIUS_METERS",
                defaults.signal_reply_radius_meters,
            )?,
        };
        radar.validate()?;

        let limits = LimitsConfig {
            free_daily_connection_requests: Self::parse_var(
                "FREE_PLAN_DAILY_CONNECTION_REQUESTS",
                LimitsConfig::default().free_daily_connection_requests,
            )?,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            port,
            jwt_secret,
            push_gateway_url,
            radar,
            limits,
        })
    }

    pub fn test_defaults() -> Self {
        Self {
            database_url: None,
            db_max_connections: 5,
            port: 8080,
            jwt_secret: "test-secret-test-secret-test-secret!".into(),
            push_gateway_url: None,
            radar: RadarConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}
