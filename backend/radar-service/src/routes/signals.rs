use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::NewSignal;
use crate::routes::created;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};

/// POST /api/v1/signals
#[post("/signals")]
pub async fn create_signal(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<NewSignal>,
) -> Result<HttpResponse, AppError> {
    let signal = state
        .services
        .signals
        .create(user.id, body.into_inner())
        .await?;
    Ok(created(signal))
}
