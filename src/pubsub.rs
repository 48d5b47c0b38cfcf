//! Streaming client for the PubSub viewer-count feed
//!
//! Owns the persistent WebSocket connection: fetches the channel metadata,
//! sends the LISTEN handshake, then runs two background tasks, a heartbeat
//! sender and a frame receiver, under a shared cancellation token. Decoded
//! viewer counts flow to the caller through a bounded channel.
//!
//! There is no reconnect or retry anywhere in here: both tasks terminate
//! permanently on their first error, and a caller wanting resilience should
//! drive [`ViewerMonitor::start`] again from the outside.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::fetch::{ClientConfig, GqlClient};
use crate::message_parser::MessageParser;
use crate::types::{ChannelMetadata, MonitorError, Result, SubscriptionTopic};

/// Production PubSub endpoint
pub const PUBSUB_URL: &str = "wss://pubsub-edge.twitch.tv/v1";

/// Fixed LISTEN nonce. The service echoes it in its RESPONSE acknowledgement,
/// but nothing here ever correlates the acknowledgement back, so a constant
/// token is sufficient.
const LISTEN_NONCE: &str = "viewer-monitor";

/// Unread viewer counts the output stream holds before the producer blocks
const VIEWER_BUFFER: usize = 10;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Configuration options for the streaming client
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// PubSub endpoint URL
    pub pubsub_url: String,
    /// Interval between PING keepalives
    pub heartbeat_interval: Duration,
    /// Metadata fetcher configuration
    pub fetch: ClientConfig,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            pubsub_url: PUBSUB_URL.to_string(),
            heartbeat_interval: Duration::from_secs(300),
            fetch: ClientConfig::default(),
        }
    }
}

/// Viewer-count streaming client for a single channel
pub struct ViewerMonitor {
    fetch_client: GqlClient,
    options: MonitorOptions,
}

impl ViewerMonitor {
    /// Create a monitor with default options
    pub fn new() -> Result<Self> {
        Self::with_options(MonitorOptions::default())
    }

    /// Create a monitor with custom options
    pub fn with_options(options: MonitorOptions) -> Result<Self> {
        let fetch_client = GqlClient::with_config(options.fetch.clone())?;
        Ok(Self {
            fetch_client,
            options,
        })
    }

    /// Start monitoring a channel.
    ///
    /// Fetches the metadata snapshot, opens the PubSub connection, and sends
    /// the LISTEN request for the channel's topic. On success the background
    /// tasks are already running and the returned receiver yields viewer
    /// counts until cancellation or a connection failure closes it. Any
    /// failure before that point is returned directly and starts nothing.
    pub async fn start(
        &self,
        cancel: CancellationToken,
        login: &str,
    ) -> Result<(ChannelMetadata, mpsc::Receiver<u64>)> {
        let metadata = self.fetch_client.fetch_channel(login).await?;
        let topic = SubscriptionTopic::for_channel(&metadata.id);

        let (ws, _response) = connect_async(self.options.pubsub_url.as_str())
            .await
            .map_err(MonitorError::Connect)?;
        info!("Connected to PubSub, subscribing to {}", topic);

        let (mut write, read) = ws.split();

        let listen = json!({
            "type": "LISTEN",
            "nonce": LISTEN_NONCE,
            "data": {"topics": [topic.as_str()]},
        });
        write
            .send(Message::Text(listen.to_string().into()))
            .await
            .map_err(MonitorError::Handshake)?;

        let (tx, rx) = mpsc::channel(VIEWER_BUFFER);

        // The write half belongs to the heartbeat task, the read half to the
        // receiver task; the two only share the cancellation token.
        tokio::spawn(heartbeat_loop(
            write,
            cancel.clone(),
            self.options.heartbeat_interval,
        ));

        let initial_count = metadata.stream.as_ref().map(|stream| stream.viewers);
        tokio::spawn(receive_loop(read, tx, cancel, initial_count));

        Ok((metadata, rx))
    }
}

/// Start monitoring a channel with default options.
///
/// Convenience wrapper over [`ViewerMonitor::start`].
pub async fn monitor(
    cancel: CancellationToken,
    login: &str,
) -> Result<(ChannelMetadata, mpsc::Receiver<u64>)> {
    ViewerMonitor::new()?.start(cancel, login).await
}

/// Send a PING on every interval tick until cancellation or a send failure.
///
/// A failed send only ends this task: the connection is presumed dead and the
/// receiver discovers that on its next read. Cancellation closes the write
/// half, which emits the WebSocket close frame for the whole connection.
async fn heartbeat_loop(mut write: WsSink, cancel: CancellationToken, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the first PING
    // waits a full period.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Heartbeat task cancelled");
                if let Err(e) = write.close().await {
                    debug!("Close after cancellation failed: {}", e);
                }
                break;
            }
            _ = ticker.tick() => {
                let ping = json!({"type": "PING"});
                if let Err(e) = write.send(Message::Text(ping.to_string().into())).await {
                    warn!("Ping failed, stopping heartbeat: {}", e);
                    break;
                }
                debug!("Ping sent");
            }
        }
    }
}

/// Read frames until cancellation or a connection failure, forwarding decoded
/// viewer counts to the output channel.
///
/// Dropping `tx` on exit is what closes the output stream, on every path.
async fn receive_loop(
    mut read: WsSource,
    tx: mpsc::Sender<u64>,
    cancel: CancellationToken,
    initial_count: Option<u64>,
) {
    // A channel that was live at fetch time gives the consumer an immediate
    // reading instead of waiting for the next live event.
    if let Some(count) = initial_count {
        if !push_count(&tx, &cancel, count).await {
            return;
        }
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Receiver task cancelled");
                break;
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match MessageParser::parse_frame(text.as_str()) {
                        Ok(Some(count)) => {
                            if !push_count(&tx, &cancel, count).await {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => debug!("Dropping frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("PubSub connection closed");
                    break;
                }
                Some(Ok(_)) => {
                    // Binary and ping/pong frames are not part of the protocol
                }
                Some(Err(e)) => {
                    error!("Read failed: {}", e);
                    break;
                }
            }
        }
    }
}

/// Push one count, racing the blocking send against cancellation.
///
/// Returns false when the receiver task should stop: cancellation won the
/// race, or the consumer dropped its end of the stream.
async fn push_count(tx: &mpsc::Sender<u64>, cancel: &CancellationToken, count: u64) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        result = tx.send(count) => result.is_ok(),
    }
}
