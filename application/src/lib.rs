//! Application layer for chatline
//!
//! This crate contains the session controller, the persistence adapter,
//! and the port definitions they are wired through. It depends only on the
//! domain layer.

pub mod persistence;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use persistence::{HISTORY_BACKUP_KEY, HISTORY_KEY, MODEL_KEY, SessionStore, THEME_KEY};
pub use ports::{
    completion_gateway::{CompletionGateway, GatewayError, GatewayErrorKind},
    key_value_store::{KeyValueStore, MemoryKeyValueStore, StoreError},
    render_sink::{NoRender, RenderSink},
};
pub use use_cases::session_controller::{
    OFFLINE_NOTICE, SessionController, SessionError, TurnOutcome, error_reply,
};
