use crate::relay::RoutingError;
use async_trait::async_trait;
use pairline_core::{PeerId, ServerMessage};

/// Outbound side of the transport endpoint: delivery by peer id plus the
/// liveness view matchmaking relies on.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Hand a frame to a connected peer. Never blocks on the socket.
    async fn deliver(&self, peer_id: &PeerId, msg: ServerMessage) -> Result<(), RoutingError>;

    /// Whether `peer_id` still has an open connection.
    fn is_connected(&self, peer_id: &PeerId) -> bool;
}
