//! Request state of a session

use serde::{Deserialize, Serialize};

/// Whether a completion request is in flight (Value Object)
///
/// Scoped to the whole session: at most one request may be outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingReply,
}

impl RequestState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestState::Idle => write!(f, "idle"),
            RequestState::AwaitingReply => write!(f, "awaiting reply"),
        }
    }
}
