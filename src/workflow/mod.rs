pub mod create_session;
pub mod events;
pub mod session_state;
pub mod update_session;

pub use create_session::CreateSession;
pub use events::{EventSink, ReviewEvent};
pub use update_session::UpdateSession;
