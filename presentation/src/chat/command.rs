//! Slash commands understood by the chat REPL

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    /// Reset the conversation
    Clear,
    /// Write the conversation to a JSON file
    Export,
    /// Show (`None`) or select the model
    Model(Option<String>),
    Models,
    /// Toggle (`None`) or set the theme
    Theme(Option<String>),
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`; returns `None` for ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        Some(match name.to_ascii_lowercase().as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "clear" | "reset" => ReplCommand::Clear,
            "export" => ReplCommand::Export,
            "model" => ReplCommand::Model(arg),
            "models" => ReplCommand::Models,
            "theme" => ReplCommand::Theme(arg),
            "quit" | "exit" | "q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(line.to_string()),
        })
    }

    pub fn help_text() -> &'static str {
        "Commands:
  /help, /h, /?       - Show this help
  /clear              - Clear the conversation
  /export             - Save the conversation as JSON
  /model [id]         - Show or select the model
  /models             - List known models
  /theme [light|dark] - Toggle or set the color theme
  /quit, /exit, /q    - Exit chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(ReplCommand::parse("hello /model"), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            ReplCommand::parse("/model  llama3-8b-8192 "),
            Some(ReplCommand::Model(Some("llama3-8b-8192".to_string())))
        );
        assert_eq!(ReplCommand::parse("/model"), Some(ReplCommand::Model(None)));
        assert_eq!(
            ReplCommand::parse("/theme light"),
            Some(ReplCommand::Theme(Some("light".to_string())))
        );
        assert_eq!(ReplCommand::parse("/Theme"), Some(ReplCommand::Theme(None)));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/exit"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/?"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/reset"), Some(ReplCommand::Clear));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            ReplCommand::parse("/frobnicate now"),
            Some(ReplCommand::Unknown("/frobnicate now".to_string()))
        );
    }
}
