use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

/// Frames accepted from clients. Ids arrive as strings so a malformed id can
/// be answered in-band instead of tearing down deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage {
        match_id: Option<String>,
        text: Option<String>,
    },
    Typing {
        match_id: Option<String>,
    },
    StopTyping {
        match_id: Option<String>,
    },
}

/// Frames pushed to clients, JSON-encoded with a `type` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        user_id: Uuid,
    },
    Error {
        message: String,
    },
    NewMessage {
        message: Message,
    },
    MessageSent {
        message: Message,
    },
    NewMatch {
        match_id: Uuid,
        user_a: Uuid,
        user_b: Uuid,
    },
    Typing {
        match_id: Uuid,
        user_id: Uuid,
    },
    StopTyping {
        match_id: Uuid,
        user_id: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn server_events_carry_a_type_tag() {
        let event = ServerEvent::Connected {
            user_id: Uuid::now_v7(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"user_id\""));
    }

    #[test]
    fn new_message_embeds_the_full_message() {
        let message = Message {
            id: Uuid::now_v7(),
            match_id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            text: "on my way".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&ServerEvent::NewMessage { message }).unwrap();
        assert!(json.contains("\"type\":\"new_message\""));
        assert!(json.contains("\"text\":\"on my way\""));
    }

    #[test]
    fn client_send_message_parses() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"send_message","match_id":"abc","text":"hello"}"#,
        )
        .unwrap();
        match event {
            ClientEvent::SendMessage { match_id, text } => {
                assert_eq!(match_id.as_deref(), Some("abc"));
                assert_eq!(text.as_deref(), Some("hello"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_parse_as_none() {
        let event: ClientEvent = serde_json::from_str(r#"{"type":"send_message"}"#).unwrap();
        match event {
            ClientEvent::SendMessage { match_id, text } => {
                assert!(match_id.is_none());
                assert!(text.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_does_not_parse() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"wave"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"text":"no tag"}"#).is_err());
    }

    #[test]
    fn typing_events_name_the_typist() {
        let match_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let json = serde_json::to_string(&ServerEvent::StopTyping { match_id, user_id }).unwrap();
        assert!(json.contains("\"type\":\"stop_typing\""));
        assert!(json.contains(&match_id.to_string()));
        assert!(json.contains(&user_id.to_string()));
    }
}
