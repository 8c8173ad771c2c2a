use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Where the reconnect state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// A transport has been created and has not opened yet
    Connecting = 0,
    /// The current transport is established
    Open = 1,
    /// The last transport closed; a new attempt is scheduled
    RetryPending = 2,
    /// Terminal: the handle was closed or retries were exhausted
    Closed = 3,
}

impl ConnectionState {
    #[inline]
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::RetryPending,
            _ => ConnectionState::Closed,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }
}

/// Lock-free mirror of the connection state for cheap reads
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get().is_terminal()
    }
}

/// Counters updated by the client
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    connect_attempts: AtomicU64,
    reconnect_count: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_attempts(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        let state = AtomicConnectionState::new(ConnectionState::Connecting);
        assert_eq!(state.get(), ConnectionState::Connecting);
        assert!(!state.is_connected());

        state.set(ConnectionState::Open);
        assert!(state.is_connected());

        state.set(ConnectionState::RetryPending);
        assert!(!state.is_connected());
        assert!(!state.is_closed());

        state.set(ConnectionState::Closed);
        assert!(state.is_closed());
    }

    #[test]
    fn test_metrics_counters() {
        let metrics = AtomicMetrics::new();
        metrics.increment_sent();
        metrics.increment_sent();
        metrics.increment_received();
        metrics.increment_attempts();
        metrics.increment_reconnects();

        assert_eq!(metrics.messages_sent(), 2);
        assert_eq!(metrics.messages_received(), 1);
        assert_eq!(metrics.connect_attempts(), 1);
        assert_eq!(metrics.reconnect_count(), 1);
    }
}
