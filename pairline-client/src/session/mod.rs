mod call_worker;
pub mod session;
pub mod session_handle;
pub mod session_update;
pub mod state;

pub use session::*;
pub use session_handle::*;
pub use session_update::*;
pub use state::*;
