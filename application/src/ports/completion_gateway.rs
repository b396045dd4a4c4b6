//! Completion Gateway port
//!
//! Defines the interface for requesting one assistant reply from the
//! completion API.

use async_trait::async_trait;
use chatline_domain::{Model, TransportMessage};
use thiserror::Error;

/// Category of a gateway failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The boundary rejected the HTTP method. Unreachable through the
    /// session controller.
    InvalidMethod,
    /// The completion provider returned an error or a malformed payload.
    UpstreamFailure,
    /// The request could not be completed.
    NetworkFailure,
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayErrorKind::InvalidMethod => write!(f, "invalid method"),
            GatewayErrorKind::UpstreamFailure => write!(f, "upstream failure"),
            GatewayErrorKind::NetworkFailure => write!(f, "network failure"),
        }
    }
}

/// Error returned by a [`CompletionGateway`]
///
/// `detail` is the provider's own message when one was available and is
/// what the user ends up reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub detail: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_method(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidMethod, detail)
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::UpstreamFailure, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::NetworkFailure, detail)
    }
}

/// Gateway to the completion API
///
/// One call is one outbound request: implementations make exactly one
/// attempt and never retry. They must not touch the message log or
/// persistence.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Request the assistant reply for `messages` from `model`
    async fn complete(
        &self,
        messages: &[TransportMessage],
        model: &Model,
    ) -> Result<String, GatewayError>;
}
