//! Terminal chat over the `/ws` channel
//!
//! Prints every broadcast of the channel and sends each line typed on
//! stdin. The connection is re-established automatically.
//!
//! Usage: `ws_chat [url]`

use anyhow::{Context, Result};
use resocket::{FixedDelay, ResocketError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use ws_chat_client::bin_common::{config_path, init_tracing, parse_args, ChatSettings};
use ws_chat_client::chat::Incoming;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = parse_args();
    let path = config_path();
    let settings = ChatSettings::load(&path, args.first().map(String::as_str))?;

    info!(
        "Connecting to {} (retry every {:?})",
        settings.url,
        settings.retry_delay()
    );

    let client = resocket::builder()
        .url(settings.connect_url())
        .on_message(|message| println!("{}", Incoming::parse(&message)))
        .reconnect_strategy(FixedDelay::forever(settings.retry_delay()))
        .event_capacity(settings.event_capacity)
        .build()
        .context("Failed to start WebSocket client")?;

    println!("Type a message and press Enter. Press Ctrl+C to stop\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match client.send(line) {
                            Ok(()) => {}
                            Err(ResocketError::NotConnected) => {
                                warn!("Not connected, message not sent: {}", line);
                            }
                            Err(e) => return Err(e).context("Failed to send message"),
                        }
                    }
                    None => {
                        info!("stdin closed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
                break;
            }
        }
    }

    let metrics = client.metrics();
    client.shutdown().await.context("Failed to shut down client")?;

    info!(
        "Shutdown complete ({} sent, {} received, {} reconnects)",
        metrics.messages_sent, metrics.messages_received, metrics.reconnect_count
    );
    Ok(())
}
