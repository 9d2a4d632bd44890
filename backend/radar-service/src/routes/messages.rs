use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::SendMessage;
use crate::routes::{created, ok};
use crate::state::AppState;
use actix_web::{delete, get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub message_ids: Vec<Uuid>,
}

/// POST /api/v1/messages
#[post("/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<SendMessage>,
) -> Result<HttpResponse, AppError> {
    let message = state
        .services
        .messages
        .send(user.id, body.into_inner())
        .await?;
    Ok(created(message))
}

/// GET /api/v1/messages/unread-count
#[get("/messages/unread-count")]
pub async fn unread_count(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let count = state.services.messages.unread_count(user.id).await?;
    Ok(ok(serde_json::json!({ "count": count })))
}

/// POST /api/v1/messages/read
#[post("/messages/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<MarkReadRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = state
        .services
        .messages
        .mark_read(user.id, &body.message_ids)
        .await?;
    Ok(ok(serde_json::json!({ "updated": updated })))
}

/// GET /api/v1/messages/with/{user_id}
#[get("/messages/with/{user_id}")]
pub async fn get_thread(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let messages = state
        .services
        .messages
        .list_between(user.id, path.into_inner())
        .await?;
    Ok(ok(messages))
}

/// DELETE /api/v1/messages/{id}
#[delete("/messages/{id}")]
pub async fn delete_message(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state
        .services
        .messages
        .delete_for_user(user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
