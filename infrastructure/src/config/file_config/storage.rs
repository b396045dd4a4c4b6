//! Storage configuration from TOML (`[storage]` section)

use crate::config::loader::APP_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Root for persisted chat and logs; defaults to `<data_dir>/chatline`
    pub data_dir: Option<String>,
}

impl FileStorageConfig {
    pub fn app_dir(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => dirs::data_dir().map(|d| d.join(APP_DIR)),
        }
    }

    /// Directory of the key-value store
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.app_dir().map(|d| d.join("storage"))
    }

    /// Directory of the chat-mode log files
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.app_dir().map(|d| d.join("logs"))
    }
}
