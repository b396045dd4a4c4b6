//! Infrastructure layer for chatline
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer (HTTP completion gateway, file-backed storage), the
//! completion proxy served by `chatline serve`, and configuration file
//! loading.

pub mod config;
pub mod gateway;
pub mod proxy;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileClientConfig, FileConfig, FileProxyConfig, FileReplConfig,
    FileStorageConfig, Severity,
};
pub use gateway::{DEFAULT_ENDPOINT, HttpCompletionGateway};
pub use proxy::{
    error::{ProxyError, Result},
    handler::ChatProxy,
    server::ProxyServer,
    upstream::{ChatUpstream, CompletionParams, GroqClient, RelayMessage},
};
pub use storage::FileKeyValueStore;
