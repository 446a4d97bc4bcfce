use crate::error::SessionError;
use crate::session::SessionPhase;
use pairline_core::PeerId;

/// What a session reports to its user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Phase(SessionPhase),
    Matched { partner_id: PeerId, initiator: bool },
    Error(SessionError),
}
