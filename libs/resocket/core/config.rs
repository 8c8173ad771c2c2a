use crate::traits::*;
use std::sync::Arc;

/// Default capacity of the lifecycle event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for a ReconnectingSocket
///
/// Built by the type-state builder; the message callback is kept
/// apart because it moves into the driver task.
pub struct ClientConfig {
    /// Target URL, fixed for the lifetime of the handle
    pub(crate) url: String,

    /// Creates one transport per attempt
    pub(crate) connector: Arc<dyn Connector>,

    /// Decides the delay before each new attempt
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Bound of the lifecycle event channel; events beyond it are dropped
    pub(crate) event_capacity: usize,
}

impl ClientConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ResocketError::Configuration("URL must not be empty".into()));
        }
        if self.event_capacity == 0 {
            return Err(ResocketError::Configuration(
                "event capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("event_capacity", &self.event_capacity)
            .finish_non_exhaustive()
    }
}
