//! Configuration file loading for chatline
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `CHATLINE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatline.toml` or `./.chatline.toml`
//! 4. Global: `<config_dir>/chatline/config.toml`
//! 5. Default values

mod file_config;
pub(crate) mod loader;

pub use file_config::{
    ConfigIssue, FileClientConfig, FileConfig, FileProxyConfig, FileReplConfig, FileStorageConfig,
    Severity,
};
pub use loader::ConfigLoader;
