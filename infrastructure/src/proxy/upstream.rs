//! Upstream completion API client
//!
//! The proxy talks to an OpenAI-compatible chat completions endpoint
//! (Groq by default). [`ChatUpstream`] is the seam the handler is tested
//! through; [`GroqClient`] is the real implementation.

use super::error::{ProxyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Default chat completions URL
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Environment variable holding the upstream API key
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Sampling parameters forwarded with every completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 1.0,
        }
    }
}

/// One chat message as relayed upstream
///
/// The role is an open string so `system` (or any role the provider
/// accepts) passes through; `content` and any extra fields are forwarded
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RelayMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }

    /// Map the legacy `bot` role onto `assistant`.
    pub fn normalized(mut self) -> Self {
        if self.role == "bot" {
            self.role = "assistant".to_string();
        }
        self
    }
}

/// A non-streaming chat completion provider
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Return the first choice's content, or `None` if the provider sent
    /// no content.
    async fn chat(&self, messages: &[RelayMessage], model: &str) -> Result<Option<String>>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [RelayMessage],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<ErrorFields>,
}

#[derive(Deserialize)]
struct ErrorFields {
    message: Option<String>,
}

/// Client for the Groq (OpenAI-compatible) chat completions API
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    params: CompletionParams,
}

impl GroqClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            params: CompletionParams::default(),
        }
    }

    /// Build a client reading its key from the environment variable `var`
    pub fn from_env(url: impl Into<String>, var: &str) -> Self {
        Self::new(url, std::env::var(var).ok())
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> CompletionParams {
        self.params
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatUpstream for GroqClient {
    async fn chat(&self, messages: &[RelayMessage], model: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProxyError::MissingApiKey)?;

        let request = CompletionRequest {
            messages,
            model,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            top_p: self.params.top_p,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProxyError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body: CompletionResponse = response.json().await?;
        debug!("Upstream returned {} choices", body.choices.len());
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

/// Extract `error.message` from an OpenAI-style error body, falling back
/// to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|p| p.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string())
}
