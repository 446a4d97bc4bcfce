use pairline_core::IceServerConfig;
use pairline_core::utils::DEFAULT_STUN_ADDR;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Settings for the signaling server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Announced to every peer in its welcome frame.
    pub ice_servers: Vec<IceServerConfig>,
    /// Bound of the lobby command channel.
    pub lobby_capacity: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3001,
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned()],
                username: None,
                credential: None,
            }],
            lobby_capacity: 1024,
        }
    }
}
