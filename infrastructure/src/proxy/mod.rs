//! Completion proxy
//!
//! The server-side half of the chat: receives `{messages, model}` from the
//! client gateway, calls the hosted completion API with the server's API
//! key, and answers `{message}` or `{error, details}` with permissive CORS
//! headers.
//!
//! - [`handler::ChatProxy`] — method/CORS handling and relaying
//! - [`upstream::GroqClient`] — OpenAI-compatible upstream client
//! - [`server::ProxyServer`] — HTTP/1.1 listener

pub mod error;
pub mod handler;
pub mod server;
pub mod upstream;
