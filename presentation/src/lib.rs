//! Presentation layer for chatline
//!
//! This crate contains CLI definitions, the console renderer, the reply
//! spinner, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::{Cli, Command};
pub use config::ReplConfig;
pub use output::console::{ConsoleFormatter, ConsoleRenderSink};
pub use progress::reporter::ReplyProgress;
