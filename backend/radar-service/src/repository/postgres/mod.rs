//! PostgreSQL + PostGIS implementations.
//!
//! Every positioned table carries a generated `geog geography(Point, 4326)`
//! column, so radius predicates hit the GIST index directly.

mod connections;
mod events;
mod messages;
mod signals;
mod users;

pub use connections::PostgresConnectionRepository;
pub use events::PostgresEventRepository;
pub use messages::PostgresMessageRepository;
pub use signals::PostgresSignalRepository;
pub use users::PostgresUserRepository;
