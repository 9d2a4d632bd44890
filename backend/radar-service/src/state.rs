use crate::{
    config::Config,
    middleware::TokenVerifier,
    repository::Repositories,
    services::{PushGateway, Services},
    websocket::PresenceRegistry,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Services,
    pub presence: PresenceRegistry,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories, gateway: Arc<dyn PushGateway>) -> Self {
        let presence = PresenceRegistry::new();
        let services = Services::new(&repos, &presence, gateway, &config);
        let verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));
        Self {
            config: Arc::new(config),
            services,
            presence,
            verifier,
        }
    }
}
