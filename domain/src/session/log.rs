//! Message log for the active session

use super::entities::{Message, Role};
use super::transport::TransportMessage;
use chrono::{DateTime, Utc};

/// Ordered, append-only sequence of messages (Aggregate)
///
/// Insertion order is chronological order is display order. Entries are
/// never edited or removed individually; [`MessageLog::clear`] is the only
/// way to shrink the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted records, keeping their order.
    ///
    /// Stamps that go backwards are raised the same way
    /// [`append_at`](Self::append_at) raises them.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut log = Self::new();
        for message in messages {
            log.append_at(
                message.role(),
                message.content().to_string(),
                message.timestamp(),
            );
        }
        log
    }

    /// Append a message stamped with the current time.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.append_at(role, content, Utc::now())
    }

    /// Append a message stamped with `at`.
    ///
    /// The stamp is raised to the previous entry's timestamp if the clock
    /// went backwards, keeping timestamps non-decreasing.
    pub fn append_at(
        &mut self,
        role: Role,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &Message {
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp() > at => last.timestamp(),
            _ => at,
        };
        self.messages.push(Message::new(role, content, timestamp));
        &self.messages[self.messages.len() - 1]
    }

    /// Remove every entry. Idempotent.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Role/content pairs for the completion API.
    ///
    /// Recomputed on every call; the returned iterator borrows the log and
    /// holds no state of its own.
    pub fn to_transport_form(&self) -> impl Iterator<Item = TransportMessage> + '_ {
        self.messages.iter().map(TransportMessage::from)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Pretty-printed JSON array in the persisted record layout.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.messages)
    }
}
