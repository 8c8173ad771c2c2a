pub mod states;

use crate::client::{MessageCallback, ReconnectingSocket};
use crate::config::{ClientConfig, DEFAULT_EVENT_CAPACITY};
use crate::traits::*;
use crate::ws_transport::TungsteniteConnector;
use states::*;
use std::sync::Arc;

/// Type-state builder for ReconnectingSocket
///
/// The URL and the message callback are required; `build()` is only
/// available once both are set. Everything else has a default:
/// tokio-tungstenite transport, fixed 1 s delay, unlimited retries.
pub struct ReconnectingSocketBuilder<U, H>
where
    U: UrlState,
    H: HandlerState,
{
    _state: TypeState<U, H>,
    url: Option<String>,
    on_message: Option<MessageCallback>,
    connector: Option<Arc<dyn Connector>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    event_capacity: usize,
}

impl ReconnectingSocketBuilder<NoUrl, NoHandler> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            on_message: None,
            connector: None,
            reconnect_strategy: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Default for ReconnectingSocketBuilder<NoUrl, NoHandler> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<H> ReconnectingSocketBuilder<NoUrl, H>
where
    H: HandlerState,
{
    pub fn url(self, url: impl Into<String>) -> ReconnectingSocketBuilder<HasUrl, H> {
        ReconnectingSocketBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            on_message: self.on_message,
            connector: self.connector,
            reconnect_strategy: self.reconnect_strategy,
            event_capacity: self.event_capacity,
        }
    }
}

// Callback setting
impl<U> ReconnectingSocketBuilder<U, NoHandler>
where
    U: UrlState,
{
    /// Set the callback that receives every payload, in arrival order
    pub fn on_message<F>(self, callback: F) -> ReconnectingSocketBuilder<U, HasHandler>
    where
        F: FnMut(WsMessage) + Send + 'static,
    {
        ReconnectingSocketBuilder {
            _state: TypeState::new(),
            url: self.url,
            on_message: Some(Box::new(callback)),
            connector: self.connector,
            reconnect_strategy: self.reconnect_strategy,
            event_capacity: self.event_capacity,
        }
    }
}

// Optional configuration methods
impl<U, H> ReconnectingSocketBuilder<U, H>
where
    U: UrlState,
    H: HandlerState,
{
    /// Use a different transport (defaults to tokio-tungstenite)
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Share an existing connector
    pub fn shared_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Bound of the lifecycle event channel
    ///
    /// Events are dropped, not queued, once this many are unread.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

// Build method - only available when all required fields are set
impl ReconnectingSocketBuilder<HasUrl, HasHandler> {
    /// Start the client
    ///
    /// The first connection attempt is made before this returns.
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<ReconnectingSocket> {
        let url = self
            .url
            .ok_or_else(|| ResocketError::Configuration("URL must be set".into()))?;
        let on_message = self
            .on_message
            .ok_or_else(|| ResocketError::Configuration("message callback must be set".into()))?;

        let config = ClientConfig {
            url,
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(TungsteniteConnector::new())),
            reconnect_strategy: self
                .reconnect_strategy
                .unwrap_or_else(|| Box::new(FixedDelay::default())),
            event_capacity: self.event_capacity,
        };

        ReconnectingSocket::start(config, on_message)
    }
}
