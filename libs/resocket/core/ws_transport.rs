//! tokio-tungstenite transport
//!
//! Each attempt runs in its own task. The handle returned to the client
//! only holds the outbound queue, so `send` and `close` never wait on the
//! network.

use crate::traits::*;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

/// Commands from the handle to the socket task
#[derive(Debug)]
enum Outbound {
    Frame(Message),
    Close,
}

/// Connector for `ws://` and `wss://` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for TungsteniteConnector {
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Transport>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            ResocketError::Configuration("a Tokio runtime is required to connect".into())
        })?;

        let (outbound_tx, outbound_rx) = unbounded_channel();
        runtime.spawn(run_socket(url.to_string(), outbound_rx, events));

        Ok(Box::new(TungsteniteTransport {
            outbound: outbound_tx,
        }))
    }
}

/// Handle to one socket task
///
/// Dropping it has the same effect as `close`.
#[derive(Debug)]
pub struct TungsteniteTransport {
    outbound: UnboundedSender<Outbound>,
}

impl Transport for TungsteniteTransport {
    fn send(&mut self, message: WsMessage) -> Result<()> {
        self.outbound
            .send(Outbound::Frame(message.into_tungstenite()))
            .map_err(|_| ResocketError::ConnectionClosed("socket task has exited".into()))
    }

    fn close(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

async fn run_socket(url: String, mut outbound: UnboundedReceiver<Outbound>, events: EventSink) {
    let generation = events.generation();

    let connected = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = closed_before_open(&mut outbound) => {
            debug!("Transport {} closed before it opened", generation);
            events.close(Some("closed before open".into()));
            return;
        }
    };

    let ws_stream = match connected {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            events.error(Some(e.to_string()));
            events.close(None);
            return;
        }
    };

    if !events.open() {
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|reason| !reason.is_empty());
                        events.close(reason);
                        break;
                    }
                    Some(Ok(msg)) => {
                        if let Some(message) = WsMessage::from_tungstenite(msg) {
                            events.message(message);
                        }
                    }
                    Some(Err(e)) => {
                        events.error(Some(e.to_string()));
                        break;
                    }
                    None => {
                        events.close(Some("stream ended".into()));
                        break;
                    }
                }
            }

            cmd = outbound.recv() => {
                match cmd {
                    Some(Outbound::Frame(msg)) => {
                        if let Err(e) = write.send(msg).await {
                            events.error(Some(format!("failed to send: {}", e)));
                            break;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let _ = write.close().await;
                        events.close(Some("closed by client".into()));
                        break;
                    }
                }
            }
        }
    }

    trace!("Transport {} task exiting", generation);
}

/// Resolves once the handle asks to close (or is dropped)
///
/// Frames queued before the socket opened are discarded.
async fn closed_before_open(outbound: &mut UnboundedReceiver<Outbound>) {
    while let Some(cmd) = outbound.recv().await {
        match cmd {
            Outbound::Close => return,
            Outbound::Frame(_) => trace!("Discarding frame queued before open"),
        }
    }
}
