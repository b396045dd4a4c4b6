//! Terminal rendering of the conversation

pub mod console;
