pub mod signaling_link;
pub mod ws_signaling_client;

pub use signaling_link::*;
pub use ws_signaling_client::*;
