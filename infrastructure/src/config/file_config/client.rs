//! Chat client configuration from TOML (`[client]` section)

use super::{ConfigIssue, parse_model};
use crate::gateway::DEFAULT_ENDPOINT;
use chatline_domain::Model;
use serde::{Deserialize, Serialize};

/// Chat client configuration from TOML
///
/// # Example
///
/// ```toml
/// [client]
/// endpoint = "http://127.0.0.1:3000/api/chat"
/// default_model = "llama3-70b-8192"   # used until a model is selected
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    /// Completion proxy URL the chat posts to
    pub endpoint: String,
    /// Model used when no selection has been stored yet
    pub default_model: Option<String>,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_model: None,
        }
    }
}

impl FileClientConfig {
    pub fn parse_default_model(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        parse_model("client.default_model", self.default_model.as_deref())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            vec![ConfigIssue::error("client.endpoint", "endpoint cannot be empty")]
        } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            vec![ConfigIssue::error(
                "client.endpoint",
                format!("'{}' is not an http(s) URL", endpoint),
            )]
        } else {
            Vec::new()
        }
    }
}
