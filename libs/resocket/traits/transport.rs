use crate::error::Result;
use crate::message::WsMessage;
use tokio::sync::mpsc::UnboundedSender;

/// Notifications a transport raises during its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established
    Open,
    /// A payload arrived
    Message(WsMessage),
    /// The connection closed, with the peer's reason if one was given
    Close(Option<String>),
    /// The transport failed, with a description if one is available
    Error(Option<String>),
}

/// Where a transport reports its events
///
/// Every sink is stamped with the generation of the transport it was
/// handed to, so the client can tell current events from stale ones.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: UnboundedSender<(u64, TransportEvent)>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: UnboundedSender<(u64, TransportEvent)>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the transport this sink belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event. Returns `false` once the client is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send((self.generation, event)).is_ok()
    }

    pub fn open(&self) -> bool {
        self.emit(TransportEvent::Open)
    }

    pub fn message(&self, message: impl Into<WsMessage>) -> bool {
        self.emit(TransportEvent::Message(message.into()))
    }

    pub fn close(&self, reason: Option<String>) -> bool {
        self.emit(TransportEvent::Close(reason))
    }

    pub fn error(&self, description: Option<String>) -> bool {
        self.emit(TransportEvent::Error(description))
    }

    /// Check whether the client is still listening
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// One connection attempt over a bidirectional message channel
///
/// Both operations must return without waiting on the network.
pub trait Transport: Send {
    /// Queue a payload for transmission
    ///
    /// An error means the connection is gone; the transport still reports
    /// that through its `Close` or `Error` event.
    fn send(&mut self, message: WsMessage) -> Result<()>;

    /// Close the connection
    fn close(&mut self);
}

/// Factory for transports
///
/// `connect` starts an attempt and returns immediately; the outcome is
/// reported later through `events` (`Open`, or `Error`/`Close`).
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Transport>>;
}
