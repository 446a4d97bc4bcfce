/// Public STUN servers used when no ICE configuration has been announced.
pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Message reported by the health endpoint.
pub const HEALTH_MESSAGE: &str = "Random Video Chat Server";
