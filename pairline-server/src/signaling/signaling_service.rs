use crate::lobby::LobbyCommand;
use crate::relay::RoutingError;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use pairline_core::{IceServerConfig, PeerId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Registry of open sockets, shared by every connection task and the lobby.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) lobby_tx: mpsc::Sender<LobbyCommand>,
}

impl SignalingService {
    pub fn new(lobby_tx: mpsc::Sender<LobbyCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
            lobby_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send_message(&self, peer_id: &PeerId, msg: &ServerMessage) -> Result<(), RoutingError> {
        let Some(peer) = self.inner.peers.get(peer_id) else {
            return Err(RoutingError::NotConnected(peer_id.clone()));
        };

        let json = serde_json::to_string(msg)?;
        peer.send(Message::Text(json.into())).map_err(|e| {
            error!("Failed to send WS message to {}: {:?}", peer_id, e);
            RoutingError::ChannelClosed(peer_id.clone())
        })
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, peer_id: &PeerId, msg: ServerMessage) -> Result<(), RoutingError> {
        self.send_message(peer_id, &msg)
    }

    fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.inner.peers.contains_key(peer_id)
    }
}
