//! Request extractors that turn a bearer token into an authenticated user.

use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Authenticated caller, extracted from `Authorization: Bearer <jwt>`
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: Uuid,
}

impl FromRequest for User {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}

fn authenticate(req: &HttpRequest) -> Result<User, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(AppError::Internal)?;
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(header_value).ok_or(AppError::Unauthorized)?;
    let id = state.verifier.user_id(token)?;
    Ok(User { id })
}
