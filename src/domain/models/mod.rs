mod action;
mod backend;
mod chat_view;
mod error;
mod event;
mod failure;
mod loading;
mod profile;
mod slash_commands;
mod storage;
mod textarea;
mod turn;

pub use action::*;
pub use backend::*;
pub use chat_view::*;
pub use error::*;
pub use event::*;
pub use failure::*;
pub use loading::*;
pub use profile::*;
pub use slash_commands::*;
pub use storage::*;
pub use textarea::*;
pub use turn::*;
