use thiserror::Error;

/// Main error type for resocket
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResocketError {
    /// `send` was called while no transport is established
    /// (still connecting, or waiting for the next retry)
    #[error("Not connected")]
    NotConnected,

    /// The handle was closed and will never reconnect
    #[error("Client has been shut down")]
    ShutDown,

    /// The underlying transport rejected an operation
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for resocket operations
pub type Result<T> = std::result::Result<T, ResocketError>;
