use crate::error::SessionError;
use crate::signaling::SignalingLink;
use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use pairline_core::{ClientMessage, ServerMessage};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection to the signaling server.
#[derive(Clone)]
pub struct WsSignalingClient {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsSignalingClient {
    /// Connects to `url` (for example `ws://localhost:3001/ws`).
    ///
    /// Returns the client and the stream of server frames; the stream ends
    /// when the socket closes.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>)> {
        info!("Connecting to signaling server: {}", url);

        let (ws_stream, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        info!("Connected to signaling server");

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::sender_task(write, rx));
        tokio::spawn(Self::receiver_task(read, inbound_tx));

        Ok((Self { tx }, inbound_rx))
    }

    async fn sender_task(
        mut write: SplitSink<WsStream, Message>,
        mut rx: mpsc::UnboundedReceiver<Message>,
    ) {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = write.send(msg).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }

        let _ = write.close().await;
        debug!("Sender task terminated");
    }

    async fn receiver_task(
        mut read: SplitStream<WsStream>,
        inbound_tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let Some(msg) = decode_frame(&text) else {
                        continue;
                    };
                    if inbound_tx.send(msg).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket connection closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        debug!("Receiver task terminated");
    }
}

impl SignalingLink for WsSignalingClient {
    fn send(&self, msg: ClientMessage) -> Result<(), SessionError> {
        let json = serde_json::to_string(&msg).map_err(|_| SessionError::SignalingClosed)?;
        self.tx
            .send(Message::Text(json))
            .map_err(|_| SessionError::SignalingClosed)
    }
}

fn decode_frame(text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("Invalid frame from server: {}", e);
            None
        }
    }
}
