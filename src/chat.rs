//! Channel broadcasts
//!
//! The server relays every chat line to all members of the channel as
//! `{"user_id": .., "channel_id": "..", "message": ".."}`, including
//! join and leave notices.

use resocket::WsMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One broadcast on a chat channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub user_id: serde_json::Value,
    pub channel_id: String,
    pub message: String,
}

impl fmt::Display for ChannelMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = match &self.user_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        write!(f, "[{}] {}: {}", self.channel_id, user, self.message)
    }
}

/// What the terminal should show for a received payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Broadcast(ChannelMessage),
    Raw(String),
    Binary(usize),
}

impl Incoming {
    /// Decode a payload; anything that is not a broadcast is shown raw
    pub fn parse(message: &WsMessage) -> Self {
        match message {
            WsMessage::Text(text) => match serde_json::from_str::<ChannelMessage>(text) {
                Ok(broadcast) => Incoming::Broadcast(broadcast),
                Err(_) => Incoming::Raw(text.clone()),
            },
            WsMessage::Binary(data) => Incoming::Binary(data.len()),
        }
    }
}

impl fmt::Display for Incoming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incoming::Broadcast(broadcast) => fmt::Display::fmt(broadcast, f),
            Incoming::Raw(text) => f.write_str(text),
            Incoming::Binary(len) => write!(f, "<{} bytes of binary data>", len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast() {
        let payload = r#"{"user_id": 7, "channel_id": "channel", "message": "hi"}"#;
        let incoming = Incoming::parse(&WsMessage::Text(payload.into()));

        match &incoming {
            Incoming::Broadcast(b) => {
                assert_eq!(b.channel_id, "channel");
                assert_eq!(b.message, "hi");
            }
            other => panic!("expected broadcast, got {:?}", other),
        }
        assert_eq!(incoming.to_string(), "[channel] 7: hi");
    }

    #[test]
    fn test_string_user_id() {
        let payload = r#"{"user_id": "ab12", "channel_id": "c", "message": "x"}"#;
        let incoming = Incoming::parse(&WsMessage::Text(payload.into()));
        assert_eq!(incoming.to_string(), "[c] ab12: x");
    }

    #[test]
    fn test_plain_text_is_raw() {
        let incoming = Incoming::parse(&WsMessage::Text("hello".into()));
        assert_eq!(incoming, Incoming::Raw("hello".into()));
    }

    #[test]
    fn test_binary() {
        let incoming = Incoming::parse(&WsMessage::Binary(vec![0; 4]));
        assert_eq!(incoming.to_string(), "<4 bytes of binary data>");
    }
}
