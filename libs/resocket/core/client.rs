use crate::config::ClientConfig;
use crate::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::*;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Callback invoked with every payload received on the current transport
pub type MessageCallback = Box<dyn FnMut(WsMessage) + Send + 'static>;

/// Internal command messages for the driver task
#[derive(Debug)]
enum ClientCommand {
    /// Stop retrying and exit
    Shutdown,
}

/// Lifecycle notifications published by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A new transport was created (1-based attempt count)
    Connecting { attempt: u64 },
    /// The current transport opened
    Connected,
    /// The current transport closed
    Disconnected { reason: Option<String> },
    /// The current transport failed and was closed
    TransportError(Option<String>),
    /// The next attempt will start after this delay
    RetryScheduled(Duration),
    /// Terminal: the client will not reconnect again
    Closed,
}

/// Client metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub connect_attempts: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// The current transport and the state it is in
struct Slot {
    state: ConnectionState,
    /// Generation of the most recently created transport
    generation: u64,
    /// `None` while connecting failed, retrying, or closed
    transport: Option<Box<dyn Transport>>,
}

/// State shared between the handle and the driver task
struct Shared {
    slot: Mutex<Slot>,
    state: AtomicConnectionState,
    metrics: AtomicMetrics,
    events: Sender<ClientEvent>,
}

impl Shared {
    fn new(events: Sender<ClientEvent>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: ConnectionState::Connecting,
                generation: 0,
                transport: None,
            }),
            state: AtomicConnectionState::new(ConnectionState::Connecting),
            metrics: AtomicMetrics::new(),
            events,
        }
    }

    /// Slot state and its lock-free mirror only change together
    fn set_state(&self, slot: &mut Slot, state: ConnectionState) {
        slot.state = state;
        self.state.set(state);
    }

    fn publish(&self, event: ClientEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                trace!("Event channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// WebSocket handle that keeps one logical connection alive
///
/// The handle owns exactly one transport at a time. When it closes or
/// errors, a brand-new transport is created after the retry delay, for
/// as long as the handle lives:
///
/// ```text
/// Connecting --open--> Open --close/error--> RetryPending --delay--> Connecting
///      \_____________________error/close______________^
/// ```
///
/// `close()` (or dropping the handle) moves to the terminal `Closed`
/// state and cancels any pending retry.
///
/// Events of all transports are processed in order by a single driver
/// task; payloads reach the callback there, outside of any lock, so the
/// callback may call `send` on the handle.
pub struct ReconnectingSocket {
    url: Arc<str>,
    shared: Arc<Shared>,
    command_tx: UnboundedSender<ClientCommand>,
    event_rx: Receiver<ClientEvent>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ReconnectingSocket {
    /// Create the handle, make the first attempt and spawn the driver
    ///
    /// Called by the builder. Must run inside a Tokio runtime.
    pub(crate) fn start(config: ClientConfig, on_message: MessageCallback) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            ResocketError::Configuration("a Tokio runtime is required to start the client".into())
        })?;

        let ClientConfig {
            url,
            connector,
            reconnect_strategy,
            event_capacity,
        } = config;
        let url: Arc<str> = Arc::from(url);

        let (event_tx, event_rx) = bounded(event_capacity);
        let (transport_tx, transport_rx) = unbounded_channel();
        let (command_tx, command_rx) = unbounded_channel();
        let shared = Arc::new(Shared::new(event_tx));

        let mut driver = Driver {
            url: Arc::clone(&url),
            shared: Arc::clone(&shared),
            connector,
            strategy: reconnect_strategy,
            transport_tx,
            on_message,
            attempt: 0,
            retry_at: None,
        };

        // The first attempt happens before the handle is returned
        driver.connect();

        let task_handle = runtime.spawn(driver.run(transport_rx, command_rx));

        Ok(Self {
            url,
            shared,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
        })
    }

    /// Send a payload on the current transport
    ///
    /// Fails with `NotConnected` while connecting or waiting for a retry,
    /// and with `ShutDown` once the handle is closed. Nothing is buffered.
    ///
    /// A transport that already died but whose closure the driver has not
    /// processed yet also yields `NotConnected`; the reconnect follows from
    /// the transport's own close or error event.
    pub fn send(&self, message: impl Into<WsMessage>) -> Result<()> {
        let message = message.into();
        let mut slot = self.shared.slot.lock();

        match slot.state {
            ConnectionState::Open => {}
            ConnectionState::Closed => return Err(ResocketError::ShutDown),
            ConnectionState::Connecting | ConnectionState::RetryPending => {
                return Err(ResocketError::NotConnected)
            }
        }

        let transport = slot
            .transport
            .as_mut()
            .ok_or(ResocketError::NotConnected)?;
        if let Err(e) = transport.send(message) {
            drop(slot);
            debug!("Send to {} failed on a dead transport: {}", self.url, e);
            return Err(ResocketError::NotConnected);
        }
        drop(slot);

        self.shared.metrics.increment_sent();
        Ok(())
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    /// Check if the current transport is open
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.state.is_connected()
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        let metrics = &self.shared.metrics;
        Metrics {
            messages_sent: metrics.messages_sent(),
            messages_received: metrics.messages_received(),
            connect_attempts: metrics.connect_attempts(),
            reconnect_count: metrics.reconnect_count(),
            connection_state: self.shared.state.get(),
        }
    }

    /// Try to receive a lifecycle event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive a lifecycle event, blocking the calling thread up to `timeout`
    ///
    /// Do not call from a single-threaded runtime: the driver could not progress.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Another receiver for the lifecycle events
    ///
    /// Receivers compete for events, they are not broadcast.
    pub fn events(&self) -> Receiver<ClientEvent> {
        self.event_rx.clone()
    }

    /// Stop for good
    ///
    /// Closes the current transport, cancels any pending retry and moves
    /// to `Closed`. Idempotent.
    pub fn close(&self) {
        let transport = {
            let mut slot = self.shared.slot.lock();
            if slot.state.is_terminal() {
                return;
            }
            self.shared.set_state(&mut slot, ConnectionState::Closed);
            slot.transport.take()
        };

        info!("Closing reconnecting socket to {}", self.url);

        if let Some(mut transport) = transport {
            transport.close();
        }
        let _ = self.command_tx.send(ClientCommand::Shutdown);
        self.shared.publish(ClientEvent::Closed);
    }

    /// Close and wait for the driver task to exit
    pub async fn shutdown(mut self) -> Result<()> {
        self.close();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| ResocketError::Transport(format!("driver task failed: {}", e)))?;
        }

        debug!("Reconnecting socket to {} shut down", self.url);
        Ok(())
    }
}

impl Drop for ReconnectingSocket {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ReconnectingSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectingSocket")
            .field("url", &self.url)
            .field("state", &self.connection_state())
            .finish_non_exhaustive()
    }
}

/// Owns the reconnect state machine; runs as one Tokio task
struct Driver {
    url: Arc<str>,
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    strategy: Box<dyn ReconnectionStrategy>,
    /// Cloned into every EventSink
    transport_tx: UnboundedSender<(u64, TransportEvent)>,
    on_message: MessageCallback,
    /// Consecutive retries since the last successful open
    attempt: usize,
    retry_at: Option<Instant>,
}

impl Driver {
    async fn run(
        mut self,
        mut transport_rx: UnboundedReceiver<(u64, TransportEvent)>,
        mut command_rx: UnboundedReceiver<ClientCommand>,
    ) {
        loop {
            if self.shared.state.is_closed() {
                break;
            }

            let retry_at = self.retry_at;

            tokio::select! {
                biased;

                cmd = command_rx.recv() => {
                    match cmd {
                        Some(ClientCommand::Shutdown) => {
                            debug!("Received shutdown command");
                            break;
                        }
                        None => {
                            debug!("Handle dropped, stopping driver");
                            break;
                        }
                    }
                }

                Some((generation, event)) = transport_rx.recv() => {
                    self.on_transport_event(generation, event);
                }

                _ = retry_timer(retry_at) => {
                    self.retry_at = None;
                    self.reconnect();
                }
            }
        }

        self.release();
        info!("Driver for {} exiting", self.url);
    }

    /// Create a new transport and make it current
    fn connect(&mut self) {
        let mut slot = self.shared.slot.lock();
        if slot.state.is_terminal() {
            return;
        }

        slot.generation += 1;
        let generation = slot.generation;
        self.shared.set_state(&mut slot, ConnectionState::Connecting);
        self.shared.metrics.increment_attempts();

        let sink = EventSink::new(generation, self.transport_tx.clone());
        match self.connector.connect(&self.url, sink) {
            Ok(transport) => {
                slot.transport = Some(transport);
                drop(slot);
                debug!("Connecting to {} (attempt {})", self.url, generation);
                self.shared
                    .publish(ClientEvent::Connecting { attempt: generation });
            }
            Err(e) => {
                self.shared.set_state(&mut slot, ConnectionState::RetryPending);
                drop(slot);
                error!("Failed to start connection to {}: {}", self.url, e);
                self.shared
                    .publish(ClientEvent::TransportError(Some(e.to_string())));
                self.schedule_retry();
            }
        }
    }

    fn reconnect(&mut self) {
        self.attempt += 1;
        self.shared.metrics.increment_reconnects();
        self.connect();
    }

    fn on_transport_event(&mut self, generation: u64, event: TransportEvent) {
        let mut slot = self.shared.slot.lock();

        if slot.state.is_terminal() || generation != slot.generation || slot.transport.is_none() {
            trace!(
                "Ignoring {:?} from transport {} (current {})",
                event,
                generation,
                slot.generation
            );
            return;
        }

        match event {
            TransportEvent::Open => {
                if slot.state != ConnectionState::Connecting {
                    return;
                }
                self.shared.set_state(&mut slot, ConnectionState::Open);
                drop(slot);

                self.attempt = 0;
                self.strategy.reset();
                info!("Connected to {}", self.url);
                self.shared.publish(ClientEvent::Connected);
            }
            TransportEvent::Message(message) => {
                drop(slot);
                self.shared.metrics.increment_received();
                (self.on_message)(message);
            }
            TransportEvent::Close(reason) => {
                let closed = slot.transport.take();
                self.shared.set_state(&mut slot, ConnectionState::RetryPending);
                drop(slot);
                drop(closed);

                warn!(
                    "Socket to {} is closed, reason: {}",
                    self.url,
                    reason.as_deref().unwrap_or("none given")
                );
                self.shared.publish(ClientEvent::Disconnected { reason });
                self.schedule_retry();
            }
            TransportEvent::Error(description) => {
                let failed = slot.transport.take();
                self.shared.set_state(&mut slot, ConnectionState::RetryPending);
                drop(slot);

                error!(
                    "Socket to {} encountered error: {}. Closing socket",
                    self.url,
                    description.as_deref().unwrap_or("unknown error")
                );
                // Detached above, so its own close notification is ignored
                if let Some(mut transport) = failed {
                    transport.close();
                }
                self.shared.publish(ClientEvent::TransportError(description));
                self.schedule_retry();
            }
        }
    }

    fn schedule_retry(&mut self) {
        match self.strategy.next_delay(self.attempt) {
            Some(delay) => {
                info!(
                    "Reconnect to {} will be attempted in {:?} (retry {})",
                    self.url,
                    delay,
                    self.attempt + 1
                );
                self.retry_at = Some(Instant::now() + delay);
                self.shared.publish(ClientEvent::RetryScheduled(delay));
            }
            None => {
                self.retry_at = None;
                let mut slot = self.shared.slot.lock();
                if slot.state.is_terminal() {
                    return;
                }
                self.shared.set_state(&mut slot, ConnectionState::Closed);
                drop(slot);

                warn!("Reconnection strategy exhausted, giving up on {}", self.url);
                self.shared.publish(ClientEvent::Closed);
            }
        }
    }

    /// Final cleanup when the driver stops
    fn release(&mut self) {
        let (transport, was_closed) = {
            let mut slot = self.shared.slot.lock();
            let was_closed = slot.state.is_terminal();
            self.shared.set_state(&mut slot, ConnectionState::Closed);
            (slot.transport.take(), was_closed)
        };

        if let Some(mut transport) = transport {
            transport.close();
        }
        if !was_closed {
            self.shared.publish(ClientEvent::Closed);
        }
    }
}

async fn retry_timer(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
