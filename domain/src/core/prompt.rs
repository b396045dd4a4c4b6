//! Prompt value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Character count shown by the input counter. Advisory only: longer
/// prompts are still sent.
pub const ADVISORY_PROMPT_CHARS: usize = 4000;

/// A user submission that passed input validation (Value Object)
///
/// Holds the trimmed text; construction fails for empty or
/// whitespace-only input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    content: String,
}

impl Prompt {
    /// Validate and trim raw input
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Get the prompt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }

    /// Number of characters, as shown by the input counter
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Whether the prompt is longer than the advisory counter limit
    pub fn exceeds_advisory_limit(&self) -> bool {
        self.char_count() > ADVISORY_PROMPT_CHARS
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Prompt {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Prompt::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_trimmed() {
        let p = Prompt::parse("  Hello \n").unwrap();
        assert_eq!(p.content(), "Hello");
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert_eq!(Prompt::parse(""), Err(DomainError::EmptyMessage));
        assert_eq!(Prompt::parse(" \t\n "), Err(DomainError::EmptyMessage));
    }

    #[test]
    fn test_advisory_limit_counts_chars_not_bytes() {
        let p = Prompt::parse(&"あ".repeat(ADVISORY_PROMPT_CHARS)).unwrap();
        assert_eq!(p.char_count(), ADVISORY_PROMPT_CHARS);
        assert!(!p.exceeds_advisory_limit());

        let long = Prompt::parse(&"a".repeat(ADVISORY_PROMPT_CHARS + 1)).unwrap();
        assert!(long.exceeds_advisory_limit());
    }
}
