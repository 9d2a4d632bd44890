use crate::models::{Connection, Message, UserSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound WebSocket events from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "location_update")]
    LocationUpdate { latitude: f64, longitude: f64 },
    #[serde(rename = "message")]
    Message {
        receiver_id: Uuid,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        media_url: Option<String>,
        #[serde(default)]
        signal_id: Option<Uuid>,
    },
    #[serde(rename = "typing")]
    Typing { receiver_id: Uuid },
    #[serde(rename = "stop_typing")]
    StopTyping { receiver_id: Uuid },
}

/// Outbound WebSocket events from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    #[serde(rename = "location_update")]
    LocationUpdate {
        user_id: Uuid,
        latitude: f64,
        longitude: f64,
    },
    #[serde(rename = "new_message")]
    NewMessage { message: Message },
    #[serde(rename = "connection_request")]
    ConnectionRequest {
        connection: Connection,
        sender: Option<UserSummary>,
    },
    #[serde(rename = "connection_accepted")]
    ConnectionAccepted { connection: Connection },
    #[serde(rename = "typing")]
    Typing { sender_id: Uuid },
    #[serde(rename = "stop_typing")]
    StopTyping { sender_id: Uuid },
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_message_tolerates_missing_optionals() {
        let receiver = Uuid::new_v4();
        let raw = format!(r#"{{"type":"message","receiver_id":"{receiver}","content":"hey"}}"#);
        match serde_json::from_str::<WsInboundEvent>(&raw).unwrap() {
            WsInboundEvent::Message {
                receiver_id,
                content,
                media_url,
                signal_id,
            } => {
                assert_eq!(receiver_id, receiver);
                assert_eq!(content.as_deref(), Some("hey"));
                assert!(media_url.is_none() && signal_id.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn outbound_events_are_tagged() {
        let json = serde_json::to_value(WsOutboundEvent::StopTyping {
            sender_id: Uuid::nil(),
        })
        .unwrap();
        assert_eq!(json["type"], "stop_typing");
    }
}
