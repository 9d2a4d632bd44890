use crate::error::AppError;
use crate::middleware::guards::User;
use crate::routes::ok;
use crate::state::AppState;
use actix_web::{put, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVisibilityRequest {
    pub is_visible: Option<bool>,
    pub invisible_mode: Option<bool>,
}

/// PUT /api/v1/location
#[put("/location")]
pub async fn update_location(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<UpdateLocationRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = state
        .services
        .location
        .update_location(user.id, body.latitude, body.longitude)
        .await?;
    Ok(ok(serde_json::json!({
        "latitude": updated.latitude,
        "longitude": updated.longitude,
        "location_updated_at": updated.location_updated_at,
    })))
}

/// PUT /api/v1/visibility
#[put("/visibility")]
pub async fn update_visibility(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<UpdateVisibilityRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = state
        .services
        .location
        .set_visibility(user.id, body.is_visible, body.invisible_mode)
        .await?;
    Ok(ok(serde_json::json!({
        "is_visible": updated.is_visible,
        "invisible_mode": updated.invisible_mode,
    })))
}
