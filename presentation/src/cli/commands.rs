//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for chatline
#[derive(Parser, Debug)]
#[command(name = "chatline")]
#[command(author, version, about = "Terminal chat client and completion proxy")]
#[command(long_about = r#"
chatline keeps a persistent chat session with a hosted LLM.

The chat client posts the conversation to a completion proxy, which adds
the API key and forwards it to an OpenAI-compatible completion service.
Both halves live in this binary: `chatline` starts the chat, `chatline
serve` runs the proxy.

Configuration files are loaded from (in priority order):
1. CHATLINE_<SECTION>__<KEY>   Environment overrides
2. --config <path>             Explicit config file
3. ./chatline.toml             Project-level config
4. ~/.config/chatline/config.toml   Global config

Example:
  chatline
  chatline --model llama3-70b-8192
  chatline ask "Explain ownership in one paragraph"
  GROQ_API_KEY=... chatline serve --bind 0.0.0.0:3000
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Completion proxy URL to post chats to
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model to select for this and later sessions
    #[arg(short, long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the loading spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat (the default)
    Chat,
    /// Send one message, print the reply and exit
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Run the completion proxy
    Serve {
        /// Socket address to listen on
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

impl Cli {
    /// The selected command, defaulting to interactive chat
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}
