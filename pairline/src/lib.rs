pub use pairline_core::model::PeerId;

pub mod model {
    pub use pairline_core::model::*;
    pub use pairline_core::utils;
}

#[cfg(feature = "server")]
pub mod server {
    pub use pairline_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use pairline_client::*;
}
