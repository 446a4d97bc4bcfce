use pairline_core::{IceCandidateDescriptor, PeerId};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    AwaitingMatch,
    Offering,
    Answering,
    Connected,
    Disconnected,
}

impl SessionPhase {
    /// Phases that own a call with a partner.
    pub fn in_call(&self) -> bool {
        matches!(
            self,
            SessionPhase::Offering | SessionPhase::Answering | SessionPhase::Connected
        )
    }
}

/// Negotiation progress of the current call.
///
/// Remote candidates that arrive before the remote description is set are
/// held here and handed back, in arrival order, by [`mark_remote_set`].
///
/// [`mark_remote_set`]: NegotiationState::mark_remote_set
#[derive(Debug, Default)]
pub struct NegotiationState {
    pub phase: SessionPhase,
    pub partner: Option<PeerId>,
    /// Role the server gave this side for `partner`.
    pub initiator: bool,
    pub local_set: bool,
    pub remote_set: bool,
    /// A defining offer or answer operation is running.
    pub in_flight: bool,
    pending_candidates: VecDeque<Option<IceCandidateDescriptor>>,
}

impl NegotiationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the partner and everything negotiated with it. Phase is kept.
    pub fn reset(&mut self) {
        self.partner = None;
        self.initiator = false;
        self.local_set = false;
        self.remote_set = false;
        self.in_flight = false;
        self.pending_candidates.clear();
    }

    pub fn is_partner(&self, peer_id: &PeerId) -> bool {
        self.partner.as_ref() == Some(peer_id)
    }

    pub fn buffer_candidate(&mut self, candidate: Option<IceCandidateDescriptor>) {
        self.pending_candidates.push_back(candidate);
    }

    pub fn pending_count(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Records the remote description and drains the early candidates.
    pub fn mark_remote_set(&mut self) -> Vec<Option<IceCandidateDescriptor>> {
        self.remote_set = true;
        self.pending_candidates.drain(..).collect()
    }
}
