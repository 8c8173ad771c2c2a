//! # Resocket
//!
//! A WebSocket client that keeps one logical connection alive over an
//! unreliable transport.
//!
//! ## Features
//!
//! - **Transparent reconnect**: a closed or failed transport is replaced by a new one after a fixed delay, forever by default
//! - **Stable send**: `send` always targets the current transport and fails fast with `NotConnected` in between
//! - **Ordered delivery**: payloads reach a single callback in arrival order; nothing from a replaced transport leaks through
//! - **Explicit lifecycle**: `close()` / `shutdown()` stop retrying and cancel the pending timer
//! - **Pluggable transport**: tokio-tungstenite by default, any `Connector` for tests or other channels

pub mod core;
pub mod helpers;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    builder, client, config, connect, connection_state, ws_transport,
    builder::{states, ReconnectingSocketBuilder},
    client::{ClientEvent, MessageCallback, Metrics, ReconnectingSocket},
    config::ClientConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    ws_transport::{TungsteniteConnector, TungsteniteTransport},
};

// Re-export helpers
pub use helpers::{add_query_param, BindRegistry};
