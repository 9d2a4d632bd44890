use actix_web::{get, web, HttpResponse};
use serde::Serialize;

pub mod connections;
pub mod conversations;
pub mod events;
pub mod location;
pub mod messages;
pub mod radar;
pub mod signals;
pub mod wsroute;

/// `{ "success": true, "data": ... }` with 200
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data }))
}

/// `{ "success": true, "data": ... }` with 201
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(serde_json::json!({ "success": true, "data": data }))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every API route; shared by the binary and the HTTP tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api/v1")
            .service(connections::create_connection)
            .service(connections::update_connection)
            .service(connections::list_connections)
            .service(messages::send_message)
            .service(messages::unread_count)
            .service(messages::mark_read)
            .service(messages::get_thread)
            .service(messages::delete_message)
            .service(conversations::recent_conversations)
            .service(conversations::delete_conversation)
            .service(radar::get_radar)
            .service(signals::create_signal)
            .service(events::create_event)
            .service(location::update_location)
            .service(location::update_visibility)
            .service(wsroute::ws_handler),
    );
}
