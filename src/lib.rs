//! Terminal chat client for the starter app's `/ws` channel
//!
//! ## Architecture
//!
//! - **resocket**: reconnecting WebSocket client (re-exported from workspace)
//! - **chat**: decoding of channel broadcasts
//! - **bin_common**: configuration and logging for the binaries
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use ws_chat_client::bin_common::{init_tracing, ChatSettings};
//! use ws_chat_client::chat::ChannelMessage;
//! ```

// Re-export workspace library for convenience
pub use resocket;

pub mod chat;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod logging;
    pub mod settings;

    pub use cli::{config_path, parse_args};
    pub use logging::init_tracing;
    pub use settings::ChatSettings;
}
