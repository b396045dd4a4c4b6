//! Completion proxy configuration from TOML (`[proxy]` section)

use super::{ConfigIssue, parse_model};
use crate::proxy::upstream::{CompletionParams, DEFAULT_API_KEY_ENV, DEFAULT_UPSTREAM_URL};
use chatline_domain::Model;
use serde::{Deserialize, Serialize};

/// Completion proxy configuration from TOML
///
/// # Example
///
/// ```toml
/// [proxy]
/// bind = "127.0.0.1:3000"
/// upstream_url = "https://api.groq.com/openai/v1/chat/completions"
/// api_key_env = "GROQ_API_KEY"   # name of the variable, never the key itself
/// temperature = 0.7
/// max_tokens = 2048
/// top_p = 1.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProxyConfig {
    /// Socket address the proxy listens on
    pub bind: String,
    /// OpenAI-compatible chat completions URL
    pub upstream_url: String,
    /// Environment variable holding the upstream API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Model used when a request names none
    pub default_model: Option<String>,
}

impl Default for FileProxyConfig {
    fn default() -> Self {
        let params = CompletionParams::default();
        Self {
            bind: "127.0.0.1:3000".to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            default_model: None,
        }
    }
}

impl FileProxyConfig {
    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }

    pub fn parse_default_model(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        parse_model("proxy.default_model", self.default_model.as_deref())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.bind.trim().is_empty() {
            issues.push(ConfigIssue::error("proxy.bind", "bind address cannot be empty"));
        }
        if self.api_key_env.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "proxy.api_key_env",
                "variable name cannot be empty",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                "proxy.temperature",
                format!("{} is outside 0.0..=2.0", self.temperature),
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            issues.push(ConfigIssue::warning(
                "proxy.top_p",
                format!("{} is outside 0.0..=1.0", self.top_p),
            ));
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error("proxy.max_tokens", "max_tokens cannot be 0"));
        }
        issues
    }
}
