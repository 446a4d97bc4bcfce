use crate::error::SessionError;
use pairline_core::ClientMessage;

/// Outbound half of the connection to the signaling server.
///
/// Sending only queues the frame; delivery failures surface as the inbound
/// stream closing.
pub trait SignalingLink: Send + Sync {
    fn send(&self, msg: ClientMessage) -> Result<(), SessionError>;
}
