use pairline_core::IceServerConfig;
use pairline_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use std::time::Duration;

/// Automatic return to the waiting queue after a call ends on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeuePolicy {
    pub enabled: bool,
    /// Delay between losing a partner and rejoining the queue.
    pub debounce: Duration,
}

impl RequeuePolicy {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            debounce: Self::DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            enabled: true,
            debounce,
        }
    }
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self::with_debounce(Self::DEFAULT_DEBOUNCE)
    }
}

/// ICE configuration handed to every peer transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub requeue: RequeuePolicy,
    pub transport: TransportConfig,
}
