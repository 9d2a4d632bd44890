use actix_web::{web, App, HttpServer};
use radar_service::{
    config, db, error, logging,
    repository::{InMemoryStore, Repositories},
    routes,
    services::{HttpPushGateway, LoggingPushGateway, PushGateway},
    state::AppState,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = config::Config::from_env()?;

    let repos = match cfg.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, cfg.db_max_connections)
                .await
                .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Repositories::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let gateway: Arc<dyn PushGateway> = match cfg.push_gateway_url.as_deref() {
        Some(url) => Arc::new(HttpPushGateway::new(url)),
        None => Arc::new(LoggingPushGateway),
    };

    let port = cfg.port;
    let state = AppState::new(cfg, repos, gateway);
    let bind_addr = format!("0.0.0.0:{port}");
    tracing::info!(%bind_addr, "starting radar-service");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(e.to_string()))
}
