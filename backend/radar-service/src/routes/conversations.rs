use crate::error::AppError;
use crate::middleware::guards::User;
use crate::routes::ok;
use crate::state::AppState;
use actix_web::{delete, get, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ConversationsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub all: bool,
}

/// GET /api/v1/conversations?page&limit&all
#[get("/conversations")]
pub async fn recent_conversations(
    state: web::Data<AppState>,
    user: User,
    query: web::Query<ConversationsQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let result = state
        .services
        .conversations
        .recent_conversations(user.id, query.page, query.limit, query.all)
        .await?;
    Ok(ok(result))
}

/// DELETE /api/v1/conversations/{user_id}
#[delete("/conversations/{user_id}")]
pub async fn delete_conversation(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let hidden = state
        .services
        .messages
        .delete_conversation(user.id, path.into_inner())
        .await?;
    Ok(ok(serde_json::json!({ "hidden": hidden })))
}
