//! # Resocket Traits
//!
//! Core traits and types shared by the client and its transports:
//!
//! - **Transport** / **Connector**: one connection attempt and its factory
//! - **EventSink** / **TransportEvent**: how a transport reports open, message, close and error
//! - **ReconnectionStrategy**: how long to wait before the next attempt
//! - **WsMessage**: text or binary payload
//!
//! ## Example
//!
//! ```rust,ignore
//! use resocket::traits::*;
//!
//! struct LoopbackConnector;
//!
//! impl Connector for LoopbackConnector {
//!     fn connect(&self, _url: &str, events: EventSink) -> Result<Box<dyn Transport>> {
//!         events.open();
//!         Ok(Box::new(Loopback { events }))
//!     }
//! }
//! ```

pub mod error;
pub mod message;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use error::{ResocketError, Result};
pub use message::WsMessage;
pub use reconnect::{FixedDelay, ReconnectionStrategy, DEFAULT_RETRY_DELAY};
pub use transport::{Connector, EventSink, Transport, TransportEvent};
