//! Common test utilities for resocket integration tests
//!
//! - `MockConnector`: in-memory transport whose every attempt, send and
//!   close lands in one ordered operation log
//! - `MockWsServer`: echo server on tokio-tungstenite
//! - `LogCapture`: collects `tracing` output for assertions

#![allow(dead_code)]

use parking_lot::Mutex;
use resocket::{Connector, EventSink, ResocketError, Result, Transport, WsMessage};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

// =============================================================================
// In-memory transport
// =============================================================================

/// One entry of the shared operation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Transport `n` was created
    Connect(u64),
    /// Transport `n` was asked to send a payload
    Send(u64, WsMessage),
    /// Transport `n` was closed by the client
    Close(u64),
}

type OpLog = Arc<Mutex<Vec<Op>>>;

/// Connector that hands every attempt to the test as a `MockRemote`
#[derive(Clone)]
pub struct MockConnector {
    ops: OpLog,
    remotes: UnboundedSender<MockRemote>,
    failures: Arc<AtomicUsize>,
    sends_fail: Arc<AtomicBool>,
}

impl MockConnector {
    pub fn new() -> (Self, MockRemotes) {
        let (tx, rx) = unbounded_channel();
        let ops = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                ops: Arc::clone(&ops),
                remotes: tx,
                failures: Arc::new(AtomicUsize::new(0)),
                sends_fail: Arc::new(AtomicBool::new(false)),
            },
            MockRemotes { rx, ops },
        )
    }

    /// Make the next `n` connect calls fail synchronously
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Make every transport reject sends, as a socket whose task has exited
    pub fn fail_sends(&self, failing: bool) {
        self.sends_fail.store(failing, Ordering::SeqCst);
    }
}

impl Connector for MockConnector {
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Transport>> {
        let generation = events.generation();
        self.ops.lock().push(Op::Connect(generation));

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ResocketError::Transport("connection refused".into()));
        }

        let _ = self.remotes.send(MockRemote {
            generation,
            url: url.to_string(),
            events,
        });

        Ok(Box::new(MockTransport {
            generation,
            ops: Arc::clone(&self.ops),
            sends_fail: Arc::clone(&self.sends_fail),
        }))
    }
}

struct MockTransport {
    generation: u64,
    ops: OpLog,
    sends_fail: Arc<AtomicBool>,
}

impl Transport for MockTransport {
    fn send(&mut self, message: WsMessage) -> Result<()> {
        if self.sends_fail.load(Ordering::SeqCst) {
            return Err(ResocketError::ConnectionClosed("socket task has exited".into()));
        }
        self.ops.lock().push(Op::Send(self.generation, message));
        Ok(())
    }

    fn close(&mut self) {
        self.ops.lock().push(Op::Close(self.generation));
    }
}

/// Test side of one transport: drives its events
pub struct MockRemote {
    generation: u64,
    url: String,
    events: EventSink,
}

impl MockRemote {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn open(&self) {
        self.events.open();
    }

    pub fn deliver(&self, message: impl Into<WsMessage>) {
        self.events.message(message);
    }

    pub fn close(&self, reason: Option<&str>) {
        self.events.close(reason.map(str::to_string));
    }

    pub fn error(&self, description: &str) {
        self.events.error(Some(description.to_string()));
    }
}

/// Stream of attempts made through a `MockConnector`
pub struct MockRemotes {
    rx: UnboundedReceiver<MockRemote>,
    ops: OpLog,
}

impl MockRemotes {
    /// Wait for the next attempt
    pub async fn next(&mut self) -> Option<MockRemote> {
        self.rx.recv().await
    }

    /// Wait for the next attempt, failing the test if there is none
    pub async fn expect_next(&mut self) -> MockRemote {
        self.next().await.expect("connector was dropped")
    }

    /// Fail the test if an attempt starts within `window`
    pub async fn assert_quiet_for(&mut self, window: Duration) {
        if let Ok(Some(remote)) = tokio::time::timeout(window, self.rx.recv()).await {
            panic!(
                "unexpected connection attempt {} within {:?}",
                remote.generation, window
            );
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| matches!(op, Op::Connect(_)))
            .count()
    }

    pub fn close_count(&self, generation: u64) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| **op == Op::Close(generation))
            .count()
    }
}

/// Collects payloads delivered to the client callback
#[derive(Clone, Default)]
pub struct Inbox(Arc<Mutex<Vec<WsMessage>>>);

impl Inbox {
    pub fn callback(&self) -> impl FnMut(WsMessage) + Send + 'static {
        let inner = Arc::clone(&self.0);
        move |message| inner.lock().push(message)
    }

    pub fn texts(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .map(|m| m.as_text().unwrap_or("<binary>").to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

/// Let the driver task run until `condition` holds
///
/// Only yields, so virtual time does not move.
pub async fn settle_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after 1000 yields");
}

// =============================================================================
// Log capture
// =============================================================================

/// Shared buffer behind a `tracing` subscriber
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Install as the default subscriber for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let buffer = Arc::clone(&self.0);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogWriter(Arc::clone(&buffer)))
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

// =============================================================================
// Echo server
// =============================================================================

/// A simple mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server on a free port
    pub async fn start() -> Self {
        Self::start_on("127.0.0.1:0".parse().unwrap()).await
    }

    /// Start on a specific address (used to bring a server back up)
    pub async fn start_on(addr: SocketAddr) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self { addr, shutdown }
    }

    async fn handle_connection(stream: tokio::net::TcpStream, shutdown: Arc<Notify>) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                // Echo the message back
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Stop accepting and drop every open connection
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
