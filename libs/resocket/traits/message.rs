use tokio_tungstenite::tungstenite::Message;

/// Payload carried by a socket, either text or binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Get the message as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            WsMessage::Text(_) => None,
            WsMessage::Binary(b) => Some(b),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, WsMessage::Text(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, WsMessage::Binary(_))
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        match self {
            WsMessage::Text(s) => s.len(),
            WsMessage::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a tungstenite frame
    pub(crate) fn into_tungstenite(self) -> Message {
        match self {
            WsMessage::Text(text) => Message::Text(text),
            WsMessage::Binary(data) => Message::Binary(data),
        }
    }

    /// Convert a tungstenite frame, dropping control frames
    pub(crate) fn from_tungstenite(msg: Message) -> Option<Self> {
        match msg {
            Message::Text(text) => Some(WsMessage::Text(text)),
            Message::Binary(data) => Some(WsMessage::Binary(data)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
        }
    }
}

impl From<String> for WsMessage {
    fn from(text: String) -> Self {
        WsMessage::Text(text)
    }
}

impl From<&str> for WsMessage {
    fn from(text: &str) -> Self {
        WsMessage::Text(text.to_string())
    }
}

impl From<Vec<u8>> for WsMessage {
    fn from(data: Vec<u8>) -> Self {
        WsMessage::Binary(data)
    }
}

impl From<&[u8]> for WsMessage {
    fn from(data: &[u8]) -> Self {
        WsMessage::Binary(data.to_vec())
    }
}
