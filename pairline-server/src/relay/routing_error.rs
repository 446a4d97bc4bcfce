use pairline_core::PeerId;
use thiserror::Error;

/// Why a frame could not be handed to its addressee.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("peer {0} is not connected")]
    NotConnected(PeerId),

    #[error("outbound channel of peer {0} is closed")]
    ChannelClosed(PeerId),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}
