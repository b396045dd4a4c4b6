//! CLI entrypoint for chatline
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use chatline_application::{
    KeyValueStore, MemoryKeyValueStore, NoRender, RenderSink, SessionController, SessionStore,
};
use chatline_domain::Model;
use chatline_infrastructure::{
    ChatProxy, ConfigLoader, FileConfig, FileKeyValueStore, GroqClient, HttpCompletionGateway,
    ProxyServer, Severity,
};
use chatline_presentation::{ChatRepl, Cli, Command, ConsoleRenderSink, ReplConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let command = cli.command();
    let _guard = init_logging(cli.verbose, &command, &config);
    info!("Starting chatline");
    check_config(&config)?;

    match command {
        Command::Chat => run_chat(&cli, &config).await,
        Command::Ask { text } => run_ask(&cli, &config, &text.join(" ")).await,
        Command::Serve { bind } => run_serve(&config, bind).await,
    }
}

/// Initialize logging based on verbosity level
///
/// Interactive chat logs to a daily file so diagnostics do not interleave
/// with the conversation; other modes log to stderr.
fn init_logging(verbose: u8, command: &Command, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    if *command == Command::Chat
        && let Some(dir) = config.storage.log_dir()
        && std::fs::create_dir_all(&dir).is_ok()
    {
        let appender = tracing_appender::rolling::daily(dir, "chatline.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    None
}

/// Log every configuration issue; fail if any is an error.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("config: {}", issue),
            Severity::Error => eprintln!("config error: {}", issue),
        }
    }
    if FileConfig::has_errors(&issues) {
        bail!("Invalid configuration ({} issues)", issues.len());
    }
    Ok(())
}

/// The durable store, or an in-memory one if the data dir is unusable
fn open_store(config: &FileConfig) -> Arc<dyn KeyValueStore> {
    let Some(dir) = config.storage.storage_dir() else {
        warn!("No data directory available; the chat will not be persisted");
        return Arc::new(MemoryKeyValueStore::new());
    };
    match FileKeyValueStore::open(&dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Cannot open storage at {} ({}); the chat will not be persisted",
                dir.display(),
                e
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

fn session_store(store: Arc<dyn KeyValueStore>, config: &FileConfig) -> SessionStore {
    let store = SessionStore::new(store);
    match config.client.parse_default_model().0 {
        Some(model) => store.with_default_model(model),
        None => store,
    }
}

fn gateway(cli: &Cli, config: &FileConfig) -> Arc<HttpCompletionGateway> {
    let endpoint = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| config.client.endpoint.clone());
    info!("Using completion endpoint {}", endpoint);
    Arc::new(HttpCompletionGateway::new(endpoint))
}

fn cli_model(cli: &Cli) -> Result<Option<Model>> {
    cli.model
        .as_deref()
        .map(|m| m.parse::<Model>())
        .transpose()
        .map_err(|e| anyhow!("Invalid --model: {}", e))
}

async fn run_chat(cli: &Cli, config: &FileConfig) -> Result<()> {
    let store = session_store(open_store(config), config);
    let preferences = store.load_preferences();
    let show_progress = config.repl.show_progress && !cli.quiet;
    let sink = Arc::new(ConsoleRenderSink::new(preferences.theme).with_progress(show_progress));

    // === Dependency Injection ===
    let controller = Arc::new(SessionController::open(
        gateway(cli, config),
        store,
        sink.clone() as Arc<dyn RenderSink>,
    ));
    if let Some(model) = cli_model(cli)? {
        controller.select_model(model);
    }

    let repl_config = ReplConfig {
        show_progress,
        history_file: config.repl.history_file.as_ref().map(PathBuf::from),
        ..ReplConfig::default()
    };
    let mut repl = ChatRepl::new(controller, sink).with_config(repl_config);
    repl.run().await?;
    Ok(())
}

/// One-shot turn; the persisted conversation is left untouched.
async fn run_ask(cli: &Cli, config: &FileConfig, text: &str) -> Result<()> {
    let saved = session_store(open_store(config), config).load_preferences();
    let model = cli_model(cli)?.unwrap_or(saved.model);

    let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new())).with_default_model(model);
    let controller = SessionController::open(gateway(cli, config), store, Arc::new(NoRender));

    let outcome = controller.submit(text).await?;
    match outcome.error {
        None => {
            println!("{}", outcome.reply.content());
            Ok(())
        }
        Some(e) => bail!("{} ({})", e.detail, e.kind),
    }
}

async fn run_serve(config: &FileConfig, bind: Option<String>) -> Result<()> {
    let proxy_config = &config.proxy;
    let bind = bind.unwrap_or_else(|| proxy_config.bind.clone());

    let upstream = GroqClient::from_env(&proxy_config.upstream_url, &proxy_config.api_key_env)
        .with_params(proxy_config.completion_params());
    if !upstream.has_api_key() {
        warn!(
            "{} is not set; every completion will fail",
            proxy_config.api_key_env
        );
    }

    let mut proxy = ChatProxy::new(Arc::new(upstream));
    if let Some(model) = proxy_config.parse_default_model().0 {
        proxy = proxy.with_default_model(model);
    }

    let server = ProxyServer::bind(&bind, proxy).await?;
    println!("Completion proxy listening on http://{}/api/chat", server.local_addr()?);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}
