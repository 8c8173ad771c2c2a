use std::time::Duration;

/// Delay used between attempts when nothing else is configured
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Trait for defining reconnection strategies
///
/// Implement this trait to control how long the client waits
/// before replacing a closed transport.
pub trait ReconnectionStrategy: Send + Sync {
    /// Get the delay before the next reconnection attempt
    ///
    /// # Arguments
    /// * `attempt` - Consecutive failed attempts so far (0-indexed)
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long before reconnecting
    /// * `None` - Stop reconnecting
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Reset the strategy state (called after a successful open)
    fn reset(&mut self);

    /// Check if we should continue reconnecting
    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Fixed delay reconnection strategy
///
/// Always waits the same amount of time between reconnection attempts
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    /// Create a new fixed delay strategy
    ///
    /// # Arguments
    /// * `delay` - The fixed delay between reconnects
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }

    /// Retry forever with the given delay
    pub fn forever(delay: Duration) -> Self {
        Self::new(delay, None)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::forever(DEFAULT_RETRY_DELAY)
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }
        Some(self.delay)
    }

    fn reset(&mut self) {
        // No state to reset for fixed delay
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}
