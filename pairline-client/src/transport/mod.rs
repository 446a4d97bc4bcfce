pub mod peer_transport;
pub mod rtc_transport;
pub mod transport_event;

pub use peer_transport::*;
pub use rtc_transport::*;
pub use transport_event::*;
