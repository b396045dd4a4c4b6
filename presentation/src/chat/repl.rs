//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::ReplCommand;
use crate::config::ReplConfig;
use crate::output::console::{ConsoleFormatter, ConsoleRenderSink};
use chatline_application::{CompletionGateway, GatewayErrorKind, SessionController, SessionError};
use chatline_domain::{Model, Prompt, Theme};
use chrono::Utc;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Write an export file `chat-export-<millis>.json` into `dir`.
pub fn write_export(dir: &Path, json: &str, millis: i64) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("chat-export-{}.json", millis));
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Interactive chat REPL
pub struct ChatRepl<G: CompletionGateway + 'static> {
    controller: Arc<SessionController<G>>,
    sink: Arc<ConsoleRenderSink>,
    config: ReplConfig,
    offline_announced: bool,
}

impl<G: CompletionGateway + 'static> ChatRepl<G> {
    /// Create a new ChatRepl
    ///
    /// `sink` must be the sink the controller was opened with.
    pub fn new(controller: Arc<SessionController<G>>, sink: Arc<ConsoleRenderSink>) -> Self {
        Self {
            controller,
            sink,
            config: ReplConfig::default(),
            offline_announced: false,
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        print!(
            "{}",
            ConsoleFormatter::welcome(&self.controller.preferences().model, self.controller.len())
        );
        println!();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.trim());
                    if !self.handle_line(&line).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Handle one input line. Returns false when the REPL should exit.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        match ReplCommand::parse(line) {
            Some(command) => self.handle_command(command),
            None => {
                self.process_message(line).await;
                true
            }
        }
    }

    /// Handle slash commands. Returns false if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return false;
            }
            ReplCommand::Help => {
                println!();
                println!("{}", ReplCommand::help_text());
                println!();
            }
            ReplCommand::Clear => {
                if let Err(e) = self.controller.reset() {
                    println!("{} {}", "Cannot clear:".yellow(), e);
                }
            }
            ReplCommand::Export => self.export(),
            ReplCommand::Model(None) => {
                let model = self.controller.preferences().model;
                println!("Current model: {} ({})", model.as_str().cyan(), model.label());
            }
            ReplCommand::Model(Some(id)) => match id.parse::<Model>() {
                Ok(model) => {
                    println!("Model set to {}", model.as_str().cyan());
                    self.controller.select_model(model);
                }
                Err(e) => println!("{} {}", "Invalid model:".red(), e),
            },
            ReplCommand::Models => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::model_list(&self.controller.preferences().model)
                );
                println!();
            }
            ReplCommand::Theme(arg) => {
                let theme = match arg {
                    None => Ok(self.controller.preferences().theme.toggled()),
                    Some(name) => name.parse::<Theme>(),
                };
                match theme {
                    Ok(theme) => {
                        self.controller.set_theme(theme);
                        self.sink.set_theme(theme);
                        println!("Theme set to {}", theme);
                    }
                    Err(e) => println!("{} {}", "Invalid theme:".red(), e),
                }
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        true
    }

    async fn process_message(&mut self, text: &str) {
        if let Ok(prompt) = Prompt::parse(text)
            && prompt.exceeds_advisory_limit()
        {
            println!(
                "{}",
                format!(
                    "Note: this message is {} characters long; very long messages may be truncated by the model.",
                    prompt.char_count()
                )
                .yellow()
            );
        }

        match self.controller.submit(text).await {
            Ok(outcome) => match outcome.error {
                Some(e) if e.kind == GatewayErrorKind::NetworkFailure => {
                    if !self.offline_announced {
                        self.controller.announce_offline();
                        self.offline_announced = true;
                    }
                }
                Some(_) => {}
                None => self.offline_announced = false,
            },
            Err(SessionError::InvalidInput(e)) => debug!("Ignoring input: {}", e),
            Err(e @ SessionError::Busy) => println!("{}", e.to_string().yellow()),
        }
    }

    fn export(&self) {
        let json = match self.controller.export() {
            Ok(json) => json,
            Err(e) => {
                warn!("Export failed: {}", e);
                println!("{} {}", "Export failed:".red(), e);
                return;
            }
        };
        match write_export(&self.config.export_dir, &json, Utc::now().timestamp_millis()) {
            Ok(path) => println!("Exported {} messages to {}", self.controller.len(), path.display()),
            Err(e) => println!("{} {}", "Export failed:".red(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatline_application::{
        GatewayError, MemoryKeyValueStore, OFFLINE_NOTICE, RenderSink, SessionStore,
    };
    use chatline_domain::{Role, TransportMessage};
    use std::sync::Mutex;

    struct MockGateway {
        replies: Mutex<Vec<Result<String, GatewayError>>>,
    }

    impl MockGateway {
        fn new(mut replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl CompletionGateway for MockGateway {
        async fn complete(
            &self,
            _messages: &[TransportMessage],
            _model: &Model,
        ) -> Result<String, GatewayError> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("default".to_string()))
        }
    }

    fn repl(
        replies: Vec<Result<String, GatewayError>>,
        export_dir: &Path,
    ) -> ChatRepl<MockGateway> {
        let sink = Arc::new(ConsoleRenderSink::new(Theme::Dark).with_progress(false));
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        let controller = Arc::new(SessionController::open(
            MockGateway::new(replies),
            store,
            sink.clone() as Arc<dyn RenderSink>,
        ));
        ChatRepl::new(controller, sink).with_config(ReplConfig {
            show_progress: false,
            history_file: None,
            export_dir: export_dir.to_path_buf(),
        })
    }

    #[test]
    fn test_write_export_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), "[]", 1_700_000_000_123).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "chat-export-1700000000123.json"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_message_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = repl(vec![Ok("Hi!".to_string())], dir.path());

        assert!(repl.handle_line("Hello").await);
        assert!(repl.handle_line("/export").await);

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let json = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[1]["content"], "Hi!");
    }

    #[tokio::test]
    async fn test_network_failure_announces_offline_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = repl(
            vec![
                Err(GatewayError::network("connection refused")),
                Err(GatewayError::network("connection refused")),
                Ok("back".to_string()),
            ],
            dir.path(),
        );

        repl.handle_line("one").await;
        repl.handle_line("two").await;
        repl.handle_line("three").await;

        let notices = repl
            .controller
            .messages()
            .iter()
            .filter(|m| m.content() == OFFLINE_NOTICE)
            .count();
        assert_eq!(notices, 1);
        let last = repl.controller.messages().last().cloned().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "back");
    }

    #[tokio::test]
    async fn test_theme_and_model_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = repl(Vec::new(), dir.path());

        assert!(repl.handle_line("/theme").await);
        assert_eq!(repl.controller.preferences().theme, Theme::Light);
        assert_eq!(repl.sink.theme(), Theme::Light);

        assert!(repl.handle_line("/theme purple").await);
        assert_eq!(repl.controller.preferences().theme, Theme::Light);

        assert!(repl.handle_line("/model gemma-7b-it").await);
        assert_eq!(repl.controller.preferences().model, Model::Gemma7b);
    }

    #[tokio::test]
    async fn test_clear_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut repl = repl(vec![Ok("Hi!".to_string())], dir.path());

        repl.handle_line("Hello").await;
        assert_eq!(repl.controller.len(), 2);
        assert!(repl.handle_line("/clear").await);
        assert!(repl.controller.is_empty());
        assert!(!repl.handle_line("/quit").await);
    }
}
