use crate::error::AppError;
use crate::middleware::guards::User;
use crate::routes::ok;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RadarQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

/// GET /api/v1/radar?lat&lng&radius
#[get("/radar")]
pub async fn get_radar(
    state: web::Data<AppState>,
    user: User,
    query: web::Query<RadarQuery>,
) -> Result<HttpResponse, AppError> {
    let result = state
        .services
        .proximity
        .get_nearby(user.id, query.lat, query.lng, query.radius)
        .await?;
    Ok(ok(result))
}
