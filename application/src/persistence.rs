//! Persistence adapter
//!
//! Maps the session's message log and preferences onto a
//! [`KeyValueStore`]. Storage is best effort: every failure is logged and
//! then treated as "absent" (reads) or ignored (writes), so the in-memory
//! session stays authoritative.

use crate::ports::key_value_store::KeyValueStore;
use chatline_domain::{Message, Model, SessionPreferences, Theme};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key holding the JSON array of messages
pub const HISTORY_KEY: &str = "chatHistory";
/// Key receiving the raw history when some of it could not be read
pub const HISTORY_BACKUP_KEY: &str = "chatHistory_backup";
/// Key holding the selected model identifier
pub const MODEL_KEY: &str = "selectedModel";
/// Key holding the theme (`"light"`; anything else means dark)
pub const THEME_KEY: &str = "theme";

/// Typed, failure-tolerant view over a key-value store
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    default_model: Model,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            default_model: Model::default(),
        }
    }

    /// Model used when none (or an unreadable one) is stored
    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    /// Persist the full log, replacing the stored one.
    pub fn save_log(&self, messages: &[Message]) {
        let json = match serde_json::to_string(messages) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize chat history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(HISTORY_KEY, &json) {
            warn!("Failed to save chat history: {}", e);
        }
    }

    /// Load the persisted log. Missing or unreadable history yields an
    /// empty log.
    pub fn load_log(&self) -> Vec<Message> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to load chat history: {}", e);
                return Vec::new();
            }
        };
        let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding unreadable chat history: {}", e);
                self.back_up_history(&raw);
                return Vec::new();
            }
        };

        let total = records.len();
        let messages: Vec<Message> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value::<Message>(record) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("Skipping unreadable history record {}: {}", i, e);
                    None
                }
            })
            .collect();
        if messages.len() < total {
            self.back_up_history(&raw);
        }
        debug!("Restored {} of {} messages from storage", messages.len(), total);
        messages
    }

    /// Keep the raw history under [`HISTORY_BACKUP_KEY`] before a partial
    /// read lets the next save overwrite it.
    fn back_up_history(&self, raw: &str) {
        match self.store.set(HISTORY_BACKUP_KEY, raw) {
            Ok(()) => warn!("Original chat history kept under {}", HISTORY_BACKUP_KEY),
            Err(e) => warn!("Failed to back up chat history: {}", e),
        }
    }

    pub fn clear_log(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Failed to clear chat history: {}", e);
        }
    }

    /// Load preferences, falling back to defaults per field.
    pub fn load_preferences(&self) -> SessionPreferences {
        let model = match self.read(MODEL_KEY) {
            Some(raw) => raw.parse::<Model>().unwrap_or_else(|e| {
                warn!("Ignoring stored model: {}", e);
                self.default_model.clone()
            }),
            None => self.default_model.clone(),
        };
        let theme = Theme::from_stored(self.read(THEME_KEY).as_deref());
        SessionPreferences::new(model, theme)
    }

    pub fn save_model(&self, model: &Model) {
        if let Err(e) = self.store.set(MODEL_KEY, model.as_str()) {
            warn!("Failed to save selected model: {}", e);
        }
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!("Failed to save theme: {}", e);
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!("Failed to read {}: {}", key, e);
            None
        })
    }
}
