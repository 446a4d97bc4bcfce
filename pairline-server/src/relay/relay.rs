use crate::relay::RoutingError;
use crate::signaling::SignalingOutput;
use pairline_core::{PeerId, ServerMessage, SignalPayload};
use std::sync::Arc;
use tracing::debug;

/// Identity-addressed forwarder for handshake payloads.
///
/// Does not look at pairings: peers only ever address the partner they were
/// told about, and anything else is the sender's problem.
#[derive(Clone)]
pub struct Relay {
    output: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    pub async fn relay(
        &self,
        from_id: PeerId,
        target_id: &PeerId,
        signal: SignalPayload,
    ) -> Result<(), RoutingError> {
        debug!("Signal {} from {} to {}", signal.kind(), from_id, target_id);

        if !self.output.is_connected(target_id) {
            return Err(RoutingError::NotConnected(target_id.clone()));
        }

        self.output
            .deliver(target_id, ServerMessage::Signal { from_id, signal })
            .await
    }
}
