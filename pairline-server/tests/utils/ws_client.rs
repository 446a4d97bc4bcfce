use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use pairline_core::{ClientMessage, PeerId, ServerMessage};
use pairline_server::{ServerConfig, serve_on};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single frame from the server (ms).
pub const FRAME_TIMEOUT_MS: u64 = 2000;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Starts a real server on an ephemeral port and returns its address.
pub async fn start_test_server() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = serve_on(listener, ServerConfig::default(), std::future::pending()).await;
    });

    Ok(addr)
}

/// Minimal signaling client speaking the JSON frame protocol.
pub struct TestWsClient {
    pub peer_id: PeerId,
    stream: WsStream,
}

impl TestWsClient {
    /// Connects and consumes the welcome frame.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("Failed to connect")?;

        let mut client = Self {
            peer_id: PeerId::new(),
            stream,
        };

        match client.recv().await? {
            ServerMessage::Welcome { peer_id, .. } => client.peer_id = peer_id,
            other => bail!("Expected welcome, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(Message::Text(json)).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<ServerMessage> {
        loop {
            let frame = tokio::time::timeout(
                Duration::from_millis(FRAME_TIMEOUT_MS),
                self.stream.next(),
            )
            .await
            .context("Timeout waiting for frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).context("Invalid server frame");
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("Socket error: {}", e),
                None => bail!("Socket closed"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
