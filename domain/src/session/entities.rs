//! Session domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
///
/// Older histories tag replies as `"bot"`; that tag is read as
/// [`Role::Assistant`] so role comparisons never see two spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

impl Role {
    /// Canonical wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// Immutable once created. The layout matches the persisted
/// `chatHistory` records: `{role, content, timestamp}` with an ISO-8601
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    /// Older records of failed replies were written without content
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_without_content_reads_as_empty() {
        let message: Message =
            serde_json::from_str(r#"{"role":"bot","timestamp":"2024-01-01T00:00:01Z"}"#).unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.content(), "");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_legacy_bot_role_reads_as_assistant() {
        let role: Role = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_message_reads_browser_iso_timestamp() {
        let json = r#"{"role":"bot","content":"Hi there","timestamp":"2024-03-01T12:30:00.250Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.content(), "Hi there");
        assert_eq!(
            message.timestamp(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
                + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_message_writes_canonical_role() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = serde_json::to_value(Message::new(Role::Assistant, "ok", at)).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "ok");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }
}
