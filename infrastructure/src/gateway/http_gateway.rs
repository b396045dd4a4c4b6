//! HTTP Completion Gateway implementation
//!
//! Posts `{messages, model}` to the completion proxy and maps its answer
//! onto [`GatewayError`] kinds:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx with `{message}` | reply content |
//! | 405 | `InvalidMethod` |
//! | other non-2xx | `UpstreamFailure` with the proxy's `error` (and `details`) |
//! | unparsable body | `UpstreamFailure` |
//! | connect / send / read error | `NetworkFailure` |
//!
//! One attempt per call; the client's default timeout applies.

use async_trait::async_trait;
use chatline_application::{CompletionGateway, GatewayError};
use chatline_domain::{Model, TransportMessage};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default proxy endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";

const FALLBACK_ERROR: &str = "Failed to get response";

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [TransportMessage],
    model: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    message: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

/// Completion gateway speaking the proxy's JSON protocol over HTTP
#[derive(Debug, Clone)]
pub struct HttpCompletionGateway {
    client: Client,
    endpoint: String,
}

impl HttpCompletionGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Create a gateway with a preconfigured client
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpCompletionGateway {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl CompletionGateway for HttpCompletionGateway {
    async fn complete(
        &self,
        messages: &[TransportMessage],
        model: &Model,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            messages,
            model: model.as_str(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;
        debug!("Proxy answered {} with {} bytes", status, body.len());

        interpret_reply(status, &body)
    }
}

fn interpret_reply(status: StatusCode, body: &str) -> Result<String, GatewayError> {
    let parsed = serde_json::from_str::<ChatReply>(body);

    if !status.is_success() {
        let detail = match parsed {
            Ok(reply) => match (reply.error, reply.details) {
                (Some(error), Some(details)) => format!("{} ({})", error, details),
                (Some(error), None) => error,
                (None, _) => FALLBACK_ERROR.to_string(),
            },
            Err(_) => format!("{} (HTTP {})", FALLBACK_ERROR, status.as_u16()),
        };
        return Err(if status == StatusCode::METHOD_NOT_ALLOWED {
            GatewayError::invalid_method(detail)
        } else {
            GatewayError::upstream(detail)
        });
    }

    let reply = parsed
        .map_err(|e| GatewayError::upstream(format!("Malformed response from proxy: {}", e)))?;
    reply
        .message
        .ok_or_else(|| GatewayError::upstream("Response did not include a message"))
}
