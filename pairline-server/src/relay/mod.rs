mod relay;
mod routing_error;

pub use relay::*;
pub use routing_error::*;
