//! # Resocket core
//!
//! The reconnecting handle, its builder, and the default transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use resocket::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = resocket::builder()
//!         .url("ws://localhost:5000/ws")
//!         .on_message(|message| println!("{:?}", message))
//!         .reconnect_strategy(FixedDelay::forever(Duration::from_secs(1)))
//!         .build()?;
//!
//!     // Fails with NotConnected until the socket has opened
//!     let _ = client.send("hello");
//!
//!     client.shutdown().await
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod ws_transport;

// Re-export main types
pub use builder::{states, ReconnectingSocketBuilder};
pub use client::{ClientEvent, MessageCallback, Metrics, ReconnectingSocket};
pub use config::ClientConfig;
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use ws_transport::{TungsteniteConnector, TungsteniteTransport};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new client builder
///
/// # Example
/// ```ignore
/// let client = resocket::builder()
///     .url("wss://example.com/ws")
///     .on_message(|message| handle(message))
///     .build()?;
/// ```
pub fn builder() -> ReconnectingSocketBuilder<builder::states::NoUrl, builder::states::NoHandler>
{
    ReconnectingSocketBuilder::new()
}

/// Connect to `url` with the defaults and deliver every payload to `on_message`
///
/// Uses the tokio-tungstenite transport and retries every second, forever.
pub fn connect<F>(url: impl Into<String>, on_message: F) -> Result<ReconnectingSocket>
where
    F: FnMut(WsMessage) + Send + 'static,
{
    builder().url(url).on_message(on_message).build()
}
