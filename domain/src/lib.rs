//! Domain layer for chatline
//!
//! This crate contains the core entities and value objects of a chat
//! session. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! - **Message Log**: the ordered, append-only conversation; the source of
//!   truth for what is shown and what is sent upstream
//! - **Transport form**: the role/content projection of the log sent to the
//!   completion API
//! - **Preferences**: selected model and theme, kept across resets

pub mod core;
pub mod preferences;
pub mod session;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    model::Model,
    prompt::{ADVISORY_PROMPT_CHARS, Prompt},
};
pub use preferences::{SessionPreferences, Theme};
pub use session::{
    entities::{Message, Role},
    log::MessageLog,
    request_state::RequestState,
    transport::TransportMessage,
};
