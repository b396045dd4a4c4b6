//! Progress reporting while awaiting an assistant reply

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner shown between submitting a message and receiving the reply
pub struct ReplyProgress {
    enabled: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ReplyProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Start the spinner (no-op if disabled or already running)
    pub fn start(&self) {
        if !self.enabled {
            return;
        }
        let mut bar = self.lock();
        if bar.is_some() {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message("Waiting for reply...".cyan().to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        *bar = Some(pb);
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        if let Some(pb) = self.lock().take() {
            pb.finish_and_clear();
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ReplyProgress {
    fn default() -> Self {
        Self::new(true)
    }
}
