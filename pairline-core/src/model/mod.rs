mod peer;
mod signaling;

pub use peer::PeerId;
pub use signaling::{
    ClientMessage, IceCandidateDescriptor, IceServerConfig, ServerMessage, SignalPayload,
};
