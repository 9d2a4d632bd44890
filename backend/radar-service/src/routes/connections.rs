use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::ConnectionStatus;
use crate::routes::{created, ok};
use crate::state::AppState;
use actix_web::{get, patch, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub receiver_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub status: ConnectionStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListConnectionsQuery {
    pub status: Option<ConnectionStatus>,
}

/// POST /api/v1/connections
#[post("/connections")]
pub async fn create_connection(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<CreateConnectionRequest>,
) -> Result<HttpResponse, AppError> {
    let connection = state
        .services
        .connections
        .create(user.id, body.receiver_id)
        .await?;
    Ok(created(connection))
}

/// PATCH /api/v1/connections/{id}
#[patch("/connections/{id}")]
pub async fn update_connection(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
    body: web::Json<UpdateConnectionRequest>,
) -> Result<HttpResponse, AppError> {
    let connection = state
        .services
        .connections
        .update_status(user.id, path.into_inner(), body.status)
        .await?;
    Ok(ok(connection))
}

/// GET /api/v1/connections?status=
#[get("/connections")]
pub async fn list_connections(
    state: web::Data<AppState>,
    user: User,
    query: web::Query<ListConnectionsQuery>,
) -> Result<HttpResponse, AppError> {
    let connections = state
        .services
        .connections
        .list(user.id, query.status)
        .await?;
    Ok(ok(connections))
}
