//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface over a
//! [`SessionController`](chatline_application::SessionController).

mod command;
mod repl;

pub use command::ReplCommand;
pub use repl::{ChatRepl, write_export};
