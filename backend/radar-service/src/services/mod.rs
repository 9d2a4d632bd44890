pub mod access_gate;
pub mod connection_service;
pub mod conversation_service;
pub mod event_service;
pub mod location_service;
pub mod message_service;
pub mod notifier;
pub mod proximity;
pub mod signal_service;

pub use access_gate::AccessGate;
pub use connection_service::ConnectionService;
pub use conversation_service::ConversationService;
pub use event_service::EventService;
pub use location_service::LocationService;
pub use message_service::MessageService;
pub use notifier::{HttpPushGateway, LoggingPushGateway, Notifier, PushGateway, PushNotification};
pub use proximity::ProximityService;
pub use signal_service::SignalService;

use crate::config::Config;
use crate::repository::Repositories;
use crate::websocket::PresenceRegistry;
use std::sync::Arc;

/// Every service, wired against one set of repositories and one presence
/// registry.
#[derive(Clone)]
pub struct Services {
    pub proximity: ProximityService,
    pub access_gate: AccessGate,
    pub connections: ConnectionService,
    pub messages: MessageService,
    pub conversations: ConversationService,
    pub signals: SignalService,
    pub events: EventService,
    pub location: LocationService,
}

impl Services {
    pub fn new(
        repos: &Repositories,
        presence: &PresenceRegistry,
        gateway: Arc<dyn PushGateway>,
        config: &Config,
    ) -> Self {
        let notifier = Notifier::new(repos.users.clone(), gateway);
        let proximity = ProximityService::new(
            repos.users.clone(),
            repos.events.clone(),
            repos.signals.clone(),
            notifier.clone(),
            config.radar.clone(),
        );
        let access_gate = AccessGate::new(
            repos.users.clone(),
            repos.connections.clone(),
            repos.signals.clone(),
            proximity.clone(),
            config.radar.signal_reply_radius_meters,
        );

        Self {
            connections: ConnectionService::new(
                repos.users.clone(),
                repos.connections.clone(),
                presence.clone(),
                notifier.clone(),
                config.limits.clone(),
            ),
            messages: MessageService::new(
                repos.users.clone(),
                repos.messages.clone(),
                access_gate.clone(),
                presence.clone(),
                notifier,
            ),
            conversations: ConversationService::new(repos.users.clone(), repos.messages.clone()),
            signals: SignalService::new(repos.users.clone(), repos.signals.clone()),
            events: EventService::new(repos.users.clone(), repos.events.clone()),
            location: LocationService::new(repos.users.clone(), presence.clone()),
            proximity,
            access_gate,
        }
    }
}
