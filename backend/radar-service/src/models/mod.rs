pub mod connection;
pub mod conversation;
pub mod event;
pub mod message;
pub mod radar;
pub mod signal;
pub mod user;

pub use connection::{Connection, ConnectionStatus};
pub use conversation::{ConversationSummary, RecentConversations};
pub use event::{Event, EventWithDistance, NewEvent};
pub use message::{Message, NewMessage, SendMessage};
pub use radar::RadarResult;
pub use signal::{NewSignal, Signal, SignalWithDistance};
pub use user::{NearbyUser, User, UserSummary, UserWithDistance};
