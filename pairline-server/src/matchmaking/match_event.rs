use pairline_core::PeerId;
use serde::Serialize;

/// Notifications a matchmaking operation produced, in emission order.
/// The lobby turns each one into a frame for `peer_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    Matched {
        peer_id: PeerId,
        partner_id: PeerId,
        initiator: bool,
    },
    PartnerLeft {
        peer_id: PeerId,
    },
}

impl MatchEvent {
    pub fn recipient(&self) -> &PeerId {
        match self {
            MatchEvent::Matched { peer_id, .. } => peer_id,
            MatchEvent::PartnerLeft { peer_id } => peer_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub waiting: usize,
    pub active_pairs: usize,
}
