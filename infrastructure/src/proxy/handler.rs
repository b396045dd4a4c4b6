//! Completion proxy request handler
//!
//! Transport-independent: takes a method and a raw body, returns status,
//! headers and an optional JSON body. The listener in
//! [`server`](super::server) feeds it HTTP requests; tests call it directly.

use super::error::Result;
use super::upstream::{ChatUpstream, RelayMessage};
use chatline_domain::Model;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Headers attached to every proxy response
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET,OPTIONS,PATCH,DELETE,POST,PUT",
    ),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// `error` field of a failed completion
pub const UPSTREAM_ERROR: &str = "Failed to get response from Groq";
/// Reply used when the provider returns no content
pub const NO_RESPONSE: &str = "No response";

/// Body of a relayed chat request
///
/// Messages keep whatever role the caller sent; `model` is forwarded
/// verbatim when present, even if blank.
#[derive(Deserialize)]
struct ProxyChatRequest {
    messages: Vec<RelayMessage>,
    #[serde(default)]
    model: Option<String>,
}

/// Response produced by [`ChatProxy::handle`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    /// JSON body; `None` means an empty body
    pub body: Option<serde_json::Value>,
}

impl ProxyResponse {
    fn new(status: u16, body: Option<serde_json::Value>) -> Self {
        Self {
            status,
            headers: CORS_HEADERS.to_vec(),
            body,
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, Some(body))
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, None)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

/// Relays chat requests to a [`ChatUpstream`]
pub struct ChatProxy<U: ChatUpstream + 'static> {
    upstream: Arc<U>,
    default_model: Model,
}

impl<U: ChatUpstream + 'static> ChatProxy<U> {
    pub fn new(upstream: Arc<U>) -> Self {
        Self {
            upstream,
            default_model: Model::default(),
        }
    }

    /// Model used when a request has no `model` field
    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    /// Handle one request.
    ///
    /// `OPTIONS` is a preflight (200, empty body), `POST` is relayed, any
    /// other method gets 405.
    pub async fn handle(&self, method: &str, body: &[u8]) -> ProxyResponse {
        match method.to_ascii_uppercase().as_str() {
            "OPTIONS" => ProxyResponse::empty(200),
            "POST" => match self.relay(body).await {
                Ok(content) => ProxyResponse::json(200, json!({ "message": content })),
                Err(e) => {
                    error!("Upstream completion failed: {}", e);
                    ProxyResponse::json(
                        500,
                        json!({ "error": UPSTREAM_ERROR, "details": e.to_string() }),
                    )
                }
            },
            _ => ProxyResponse::json(405, json!({ "error": "Method not allowed" })),
        }
    }

    async fn relay(&self, body: &[u8]) -> Result<String> {
        let request: ProxyChatRequest = serde_json::from_slice(body)?;
        let model = request
            .model
            .unwrap_or_else(|| self.default_model.as_str().to_string());
        let messages: Vec<RelayMessage> = request
            .messages
            .into_iter()
            .map(RelayMessage::normalized)
            .collect();
        info!("Relaying {} messages to {:?}", messages.len(), model);

        let content = self.upstream.chat(&messages, &model).await?;
        Ok(content
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}
