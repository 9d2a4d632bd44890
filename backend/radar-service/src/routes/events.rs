use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::NewEvent;
use crate::routes::created;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};

/// POST /api/v1/events
#[post("/events")]
pub async fn create_event(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<NewEvent>,
) -> Result<HttpResponse, AppError> {
    let event = state
        .services
        .events
        .create(user.id, body.into_inner())
        .await?;
    Ok(created(event))
}
