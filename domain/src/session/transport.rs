//! Transport form of a message

use super::entities::{Message, Role};
use serde::{Deserialize, Serialize};

/// Role/content projection of a [`Message`] sent to the completion API.
///
/// Timestamps are dropped. The role always serializes to its canonical
/// tag, so a reply is sent as `"assistant"` whatever it was stored as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMessage {
    pub role: Role,
    pub content: String,
}

impl TransportMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for TransportMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}
