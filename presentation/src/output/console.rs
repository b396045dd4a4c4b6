//! Console rendering of chat messages

use crate::progress::reporter::ReplyProgress;
use chatline_application::RenderSink;
use chatline_domain::{Message, Model, RequestState, Role, Theme};
use chrono::{DateTime, Local, Utc};
use colored::{Color, Colorize};
use std::sync::Mutex;

/// Role colors for one theme
struct Palette {
    user: Color,
    assistant: Color,
    text: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                user: Color::BrightCyan,
                assistant: Color::BrightGreen,
                text: Color::BrightWhite,
            },
            Theme::Light => Self {
                user: Color::Blue,
                assistant: Color::Magenta,
                text: Color::Black,
            },
        }
    }

    fn avatar_color(&self, role: Role) -> Color {
        match role {
            Role::User => self.user,
            Role::Assistant => self.assistant,
        }
    }
}

/// Formats chat entries for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn avatar(role: Role) -> &'static str {
        match role {
            Role::User => "● You",
            Role::Assistant => "◆ Assistant",
        }
    }

    /// Timestamp rendered in local time
    pub fn local_time(timestamp: DateTime<Utc>) -> String {
        timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }

    /// Format one message: avatar line with time, then the indented text
    pub fn format_message(message: &Message, theme: Theme) -> String {
        let palette = Palette::for_theme(theme);
        let mut output = format!(
            "{} {}\n",
            Self::avatar(message.role())
                .color(palette.avatar_color(message.role()))
                .bold(),
            Self::local_time(message.timestamp()).dimmed()
        );
        for line in message.content().lines() {
            output.push_str(&format!("  {}\n", line.color(palette.text)));
        }
        output
    }

    pub fn welcome(model: &Model, restored: usize) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str("╭─────────────────────────────────────────────╮\n");
        output.push_str("│              chatline - Chat Mode           │\n");
        output.push_str("╰─────────────────────────────────────────────╯\n");
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Model:".cyan().bold(),
            model.label()
        ));
        if restored > 0 {
            output.push_str(&format!(
                "{}\n",
                format!("Restored {} messages from the last session", restored).dimmed()
            ));
        }
        output.push_str(&format!("{}\n", "Type /help for commands".dimmed()));
        output
    }

    pub fn model_list(current: &Model) -> String {
        let mut output = format!("{}\n", "Available models:".cyan().bold());
        for model in Model::known_models() {
            let marker = if &model == current { "*" } else { " " };
            output.push_str(&format!(
                "  {} {:<22} {}\n",
                marker,
                model.as_str(),
                model.label().dimmed()
            ));
        }
        if current.is_custom() {
            output.push_str(&format!("  * {:<22} {}\n", current.as_str(), "(custom)".dimmed()));
        }
        output
    }
}

/// [`RenderSink`] printing to stdout
///
/// Colors follow the theme set with [`set_theme`](Self::set_theme); the
/// loading spinner runs while the session awaits a reply.
pub struct ConsoleRenderSink {
    theme: Mutex<Theme>,
    progress: ReplyProgress,
}

impl ConsoleRenderSink {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(theme),
            progress: ReplyProgress::default(),
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.progress = ReplyProgress::new(show);
        self
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(|e| e.into_inner()) = theme;
    }
}

impl RenderSink for ConsoleRenderSink {
    fn on_append(&self, message: &Message) {
        self.progress.finish();
        println!("{}", ConsoleFormatter::format_message(message, self.theme()));
    }

    fn on_clear(&self) {
        self.progress.finish();
        println!("{}", "Chat cleared.".dimmed());
    }

    fn on_request_state(&self, state: RequestState) {
        match state {
            RequestState::AwaitingReply => self.progress.start(),
            RequestState::Idle => self.progress.finish(),
        }
    }
}
