//! contextloader - run one prompt through the progressive tool loader
//!
//! Starts every enabled server from the config file, exposes only the
//! `loader` meta-tool to the model, and prints the final answer.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contextloader_core::briefs::{BriefGenerator, BriefLimits};
use contextloader_core::{
    ConfigLevel, ConfigProvider, Conversation, Dispatcher, FileConfigProvider, GenaiCompletion,
    LoaderController, LoaderMode, Logger, McpConnector, SessionManager, TracingLogger,
};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

#[derive(Debug, Parser)]
#[command(name = "contextloader", version, about)]
struct Cli {
    /// The user prompt
    prompt: String,

    /// Config file (defaults to the user config)
    #[arg(short, long, env = "CONTEXTLOADER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the loader mode (flat or partitioned)
    #[arg(long)]
    mode: Option<LoaderMode>,

    /// Override the model, e.g. "anthropic/claude-3-5-haiku-latest"
    #[arg(short, long)]
    model: Option<String>,

    /// Optional system prompt
    #[arg(long)]
    system: Option<String>,
}

/// Install the tracing subscriber once.
///
/// `RUST_LOG` sets the filter (default `info`);
/// `CONTEXTLOADER_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var("CONTEXTLOADER_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new("contextloader"));

    let config = match &cli.config {
        Some(path) => FileConfigProvider::new(path, ConfigLevel::User),
        None => FileConfigProvider::user(),
    };
    if config.exists() {
        config
            .reload()
            .with_context(|| format!("Failed to load {}", config.path().display()))?;
    } else {
        tracing::warn!("No config at {}, using defaults", config.path().display());
    }

    let settings = config.get_loader_settings().await;
    let mut model = config.get_model().await;
    if let Some(name) = cli.model {
        model.model = name;
    }
    let mode = cli.mode.unwrap_or(settings.mode);
    let service = Arc::new(GenaiCompletion::new(model, Arc::clone(&logger)));

    let registry = Arc::new(contextloader_core::ToolRegistry::new(Arc::clone(&logger)));
    let manager = SessionManager::new(
        Arc::new(McpConnector::new(Arc::clone(&logger))),
        Arc::clone(&registry),
        Arc::clone(&logger),
    )
    .with_init_timeout(settings.init_timeout());

    let report = manager.start_all(config.enabled_servers().await).await;
    for failure in &report.failed {
        tracing::warn!("Server '{}' unavailable: {}", failure.name, failure.error);
    }

    let briefs = BriefGenerator::new(service.clone(), Arc::clone(&logger)).with_limits(BriefLimits {
        brief_max_chars: settings.brief_max_chars,
        summary_max_chars: settings.summary_max_chars,
    });
    let loader = Arc::new(
        LoaderController::new(mode, Arc::clone(&registry), briefs, Arc::clone(&logger))
            .with_hidden_tools(settings.hidden_tools.clone()),
    );
    loader.prepare().await;

    let dispatcher = Arc::new(Dispatcher::new(loader, registry, Arc::clone(&logger)));
    let mut conversation =
        Conversation::new(service, dispatcher, logger).with_max_turns(settings.max_turns);
    if let Some(system) = cli.system {
        conversation = conversation.with_system_prompt(system);
    }

    let outcome = tokio::select! {
        answer = conversation.send(cli.prompt) => answer.map(Some).map_err(anyhow::Error::from),
        signal = tokio::signal::ctrl_c() => signal.map(|_| None).context("Failed to listen for Ctrl-C"),
    };

    manager.close_all().await;

    match outcome? {
        Some(answer) => println!("{}", answer),
        None => eprintln!("Interrupted"),
    }
    Ok(())
}
