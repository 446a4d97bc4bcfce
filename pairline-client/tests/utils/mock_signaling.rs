use pairline_client::{SessionError, SignalingLink};
use pairline_core::{ClientMessage, PeerId, ServerMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// SignalingLink that records outbound frames.
///
/// Signals addressed to a routed peer are also delivered straight into that
/// peer's inbound stream, standing in for the relay.
#[derive(Clone)]
pub struct MockSignalingLink {
    peer_id: PeerId,
    sent: Arc<Mutex<Vec<ClientMessage>>>,
    sent_tx: mpsc::UnboundedSender<ClientMessage>,
    routes: Arc<Mutex<HashMap<PeerId, mpsc::UnboundedSender<ServerMessage>>>>,
}

impl MockSignalingLink {
    pub fn new(peer_id: PeerId) -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let link = Self {
            peer_id,
            sent: Arc::new(Mutex::new(Vec::new())),
            sent_tx,
            routes: Arc::new(Mutex::new(HashMap::new())),
        };
        (link, sent_rx)
    }

    pub fn route_to(&self, peer_id: PeerId, inbound: mpsc::UnboundedSender<ServerMessage>) {
        self.routes.lock().unwrap().insert(peer_id, inbound);
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_sent(&self, pred: impl Fn(&ClientMessage) -> bool) -> usize {
        self.sent.lock().unwrap().iter().filter(|m| pred(m)).count()
    }
}

impl SignalingLink for MockSignalingLink {
    fn send(&self, msg: ClientMessage) -> Result<(), SessionError> {
        tracing::debug!("[MockSignalingLink] {} sends {:?}", self.peer_id, msg);

        if let ClientMessage::Signal { target_id, signal } = &msg
            && let Some(inbound) = self.routes.lock().unwrap().get(target_id)
        {
            let _ = inbound.send(ServerMessage::Signal {
                from_id: self.peer_id.clone(),
                signal: signal.clone(),
            });
        }

        self.sent.lock().unwrap().push(msg.clone());
        let _ = self.sent_tx.send(msg);
        Ok(())
    }
}
