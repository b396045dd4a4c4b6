//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; conversion into domain types happens in
//! the `parse_*` helpers, which report problems as [`ConfigIssue`]s instead
//! of failing the load.

mod client;
mod proxy;
mod repl;
mod storage;

pub use client::FileClientConfig;
pub use proxy::FileProxyConfig;
pub use repl::FileReplConfig;
pub use storage::FileStorageConfig;

use chatline_domain::Model;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a configuration problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A fallback value is used
    Warning,
    /// The setting cannot be honored
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `proxy.bind`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Parse an optional model name, reporting an empty one.
pub(crate) fn parse_model(field: &str, value: Option<&str>) -> (Option<Model>, Vec<ConfigIssue>) {
    match value {
        None => (None, Vec::new()),
        Some(raw) => match raw.parse::<Model>() {
            Ok(model) => (Some(model), Vec::new()),
            Err(_) => (
                None,
                vec![ConfigIssue::error(field, "model name cannot be empty")],
            ),
        },
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat client settings
    pub client: FileClientConfig,
    /// Local persistence settings
    pub storage: FileStorageConfig,
    /// Completion proxy settings
    pub proxy: FileProxyConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.client.parse_default_model().1);
        issues.extend(self.client.validate());
        issues.extend(self.proxy.parse_default_model().1);
        issues.extend(self.proxy.validate());
        issues
    }

    /// True if any issue is an error rather than a warning
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
