//! Render Sink port
//!
//! Write-only projection of the message log onto the UI. Sinks only ever
//! add output; they never re-render or diff earlier entries.

use chatline_domain::{Message, RequestState};

/// Receiver of message log updates.
///
/// Called synchronously from the controller's append path, so
/// implementations must not block on I/O that can stall indefinitely.
pub trait RenderSink: Send + Sync {
    /// Called exactly once per log append, in append order.
    fn on_append(&self, message: &Message);

    /// Called once with the history restored at session start.
    fn on_history(&self, messages: &[Message]) {
        for message in messages {
            self.on_append(message);
        }
    }

    /// Called after the log was reset.
    fn on_clear(&self) {}

    /// Called when a completion request starts or finishes.
    fn on_request_state(&self, _state: RequestState) {}
}

/// No-op sink for headless use and tests.
pub struct NoRender;

impl RenderSink for NoRender {
    fn on_append(&self, _message: &Message) {}
}
