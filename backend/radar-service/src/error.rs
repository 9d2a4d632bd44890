use crate::middleware::error_handling;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Why an otherwise well-formed request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Sender and receiver are the same user
    InvalidTarget,
    /// No accepted connection between the two users
    NotConnected,
    /// Signal reply attempted while the sender is hidden from radar
    InvisibleSender,
    /// Signal reply attempted without a stored sender position
    LocationUnavailable,
    /// Receiver is outside the sender's signal reply radius
    SignalNotInRange,
    /// Only the receiver of a connection request may answer it
    NotReceiver,
    /// Caller is not a participant of the message
    NotParticipant,
}

impl Denial {
    pub fn code(&self) -> &'static str {
        match self {
            Denial::InvalidTarget => "INVALID_TARGET",
            Denial::NotConnected => "NOT_CONNECTED",
            Denial::InvisibleSender => "INVISIBLE_SENDER",
            Denial::LocationUnavailable => "LOCATION_UNAVAILABLE",
            Denial::SignalNotInRange => "SIGNAL_NOT_IN_RANGE",
            Denial::NotReceiver => "NOT_RECEIVER",
            Denial::NotParticipant => "NOT_PARTICIPANT",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Denial::InvalidTarget => "cannot target yourself",
            Denial::NotConnected => "no accepted connection with this user",
            Denial::InvisibleSender => "you must be visible to reply to a signal",
            Denial::LocationUnavailable => "your location is unknown",
            Denial::SignalNotInRange => "this user is no longer nearby",
            Denial::NotReceiver => "only the receiver can answer this request",
            Denial::NotParticipant => "not a participant of this message",
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Connection,
    Message,
    Signal,
    Event,
}

impl Resource {
    pub fn code(&self) -> &'static str {
        match self {
            Resource::User => "USER_NOT_FOUND",
            Resource::Connection => "CONNECTION_NOT_FOUND",
            Resource::Message => "MESSAGE_NOT_FOUND",
            Resource::Signal => "SIGNAL_NOT_FOUND",
            Resource::Event => "EVENT_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::User => "user",
            Resource::Connection => "connection",
            Resource::Message => "message",
            Resource::Signal => "signal",
            Resource::Event => "event",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid coordinates: latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinates,

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(Denial),

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limit exceeded for your plan")]
    RateLimited,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Returns whether this error is retryable (e.g., database connection timeout)
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            AppError::Internal => true,
            _ => false,
        }
    }

    /// Returns HTTP status code
    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::InvalidCoordinates => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::RateLimited => 429,
            AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Database(_)
            | AppError::Internal => 500,
        }
    }

    /// True for Postgres unique-constraint violations (SQLSTATE 23505)
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
            _ => false,
        }
    }
}
