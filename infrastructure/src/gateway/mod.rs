//! Completion gateway adapters
//!
//! Implements [`CompletionGateway`](chatline_application::CompletionGateway)
//! over HTTP against the completion proxy.

mod http_gateway;

pub use http_gateway::{DEFAULT_ENDPOINT, HttpCompletionGateway};
