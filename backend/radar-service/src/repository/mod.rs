pub mod memory;
mod postgres;
mod r#trait;

pub use memory::InMemoryStore;
pub use postgres::{
    PostgresConnectionRepository, PostgresEventRepository, PostgresMessageRepository,
    PostgresSignalRepository, PostgresUserRepository,
};
pub use r#trait::{
    ConnectionRepository, EventRepository, MessageRepository, SignalRepository, UserRepository,
};

use sqlx::PgPool;
use std::sync::Arc;

/// Handles to every repository, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub connections: Arc<dyn ConnectionRepository>,
    pub signals: Arc<dyn SignalRepository>,
    pub events: Arc<dyn EventRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            connections: Arc::new(PostgresConnectionRepository::new(pool.clone())),
            signals: Arc::new(PostgresSignalRepository::new(pool.clone())),
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            messages: Arc::new(PostgresMessageRepository::new(pool)),
        }
    }

    /// All five repositories backed by one shared in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            connections: store.clone(),
            signals: store.clone(),
            events: store.clone(),
            messages: store,
        }
    }
}
