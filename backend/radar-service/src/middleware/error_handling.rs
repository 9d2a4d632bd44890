use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Error half of the `{success, data | message}` envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
}

// map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorBody) {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = match err {
        AppError::Validation(_) => "VALIDATION_ERROR",
        AppError::InvalidCoordinates => "INVALID_COORDINATES",
        AppError::Unauthorized => "AUTHENTICATION_ERROR",
        AppError::Forbidden(denial) => denial.code(),
        AppError::NotFound(resource) => resource.code(),
        AppError::Conflict(_) => "CONFLICT",
        AppError::RateLimited => "RATE_LIMITED",
        AppError::Database(_) => "DATABASE_ERROR",
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal => {
            "INTERNAL_SERVER_ERROR"
        }
    };

    // never leak driver or config details to clients
    let message = if status.is_server_error() {
        tracing::error!(error = %err, "request failed with server error");
        "internal server error".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        ErrorBody {
            success: false,
            message,
            code,
        },
    )
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, body) = map_error(err);
    HttpResponse::build(status).json(body)
}
