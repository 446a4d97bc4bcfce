use pairline_core::IceCandidateDescriptor;

/// Connection state as reported by the peer transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// `Disconnected` may still recover; these never do.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransportState::Failed | TransportState::Closed)
    }
}

/// Events a transport raises on its own, outside any requested operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A local path was discovered and must reach the partner. `None` ends gathering.
    LocalCandidate(Option<IceCandidateDescriptor>),

    StateChanged(TransportState),
}
