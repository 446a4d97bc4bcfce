use thiserror::Error;

/// Failures a connection session reports to its user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Local capture unavailable or denied. Ends the session until restarted.
    #[error("media acquisition failed: {0}")]
    MediaAcquisition(String),

    /// The defining offer or answer could not be applied.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("peer transport terminated: {0}")]
    TransportTerminal(String),

    #[error("signaling link closed")]
    SignalingClosed,

    #[error("session is no longer running")]
    SessionEnded,
}
