pub mod actions;
mod app_state;
mod chat;
pub mod events;
mod scroll;
mod session_manager;
mod streaming_reducer;
mod transcript_store;

pub use app_state::*;
pub use chat::*;
pub use scroll::*;
pub use session_manager::*;
pub use streaming_reducer::*;
pub use transcript_store::*;
