mod match_event;
mod matchmaker;

pub use match_event::*;
pub use matchmaker::*;
