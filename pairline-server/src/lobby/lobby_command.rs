use crate::matchmaking::MatchStats;
use pairline_core::{PeerId, SignalPayload};
use tokio::sync::oneshot;

/// Requests the connection tasks hand to the lobby, one per inbound event.
#[derive(Debug)]
pub enum LobbyCommand {
    /// The peer wants a partner.
    JoinQueue { peer_id: PeerId },

    /// Drop the current partner and look for another one.
    Next { peer_id: PeerId },

    /// Drop the current partner and stop looking.
    Leave { peer_id: PeerId },

    /// Forward a handshake payload.
    Signal {
        from_id: PeerId,
        target_id: PeerId,
        signal: SignalPayload,
    },

    /// The socket is gone; sent after the peer left the registry.
    Disconnect { peer_id: PeerId },

    /// Snapshot of queue and pair counts.
    Stats { reply: oneshot::Sender<MatchStats> },
}
