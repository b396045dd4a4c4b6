//! Session preferences
//!
//! Persisted independently of the message log and kept across resets.

mod theme;

pub use theme::Theme;

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// User preferences for a chat session (Value Object)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPreferences {
    pub model: Model,
    pub theme: Theme,
}

impl SessionPreferences {
    pub fn new(model: Model, theme: Theme) -> Self {
        Self { model, theme }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}
