//! Chat session domain.
//!
//! - [`entities::Message`] — a single message within a session
//! - [`log::MessageLog`] — the ordered, append-only message history
//! - [`transport::TransportMessage`] — role/content form sent upstream
//! - [`request_state::RequestState`] — the single in-flight request latch

pub mod entities;
pub mod log;
pub mod request_state;
pub mod transport;
