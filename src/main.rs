//! Persona Panel - LLM persona panels for quick market research
//!
//! An agent node exposing named reasoner tasks: an echo task, a
//! market-research pipeline that consults several buyer personas in
//! parallel and summarizes their answers, and one task per persona.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, connection, task failure, etc.)

mod cli;
mod config;
mod error;
mod llm;
mod models;
mod notes;
mod panel;
mod reasoners;
mod server;

use anyhow::{Context, Result};
use cli::{Args, Command};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use llm::{OllamaClient, OllamaConfig};
use notes::{ChannelNotes, NoteSink, TracingNotes};
use panel::PersonaPanel;
use reasoners::Registry;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.command == Command::InitConfig {
        return handle_init_config();
    }

    if let Err(e) = dotenvy::dotenv() {
        // A missing .env is normal
        if !e.not_found() {
            eprintln!("Warning: failed to load .env: {}", e);
        }
    }

    init_logging(&args);

    info!("Persona Panel v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .persona-panel.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize the model, server and personas.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over --verbose/--quiet when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: tracing subscriber already set");
    }
}

/// Dispatch the selected subcommand.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    match args.command.clone() {
        Command::List => {
            let registry = build_registry(&config, Arc::new(TracingNotes))?;
            for info in registry.list() {
                println!("{:<32} {}", info.name, info.description);
            }
            Ok(())
        }
        Command::Run {
            task,
            input,
            message,
            output,
            show_notes,
        } => {
            let input = task_input(input, message)?;
            run_task(&config, &args, &task, input, output, show_notes).await
        }
        Command::Serve {
            host,
            port,
            no_auto_port,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let auto_port = config.server.auto_port && !no_auto_port;

            let registry = build_registry(&config, Arc::new(TracingNotes))?;
            let listener = server::bind(&host, port, auto_port).await?;

            let state = server::AppState {
                registry,
                node_id: config.agent.node_id.clone(),
                version: config.agent.version.clone(),
            };
            server::serve(state, listener).await
        }
        Command::InitConfig => handle_init_config(),
    }
}

/// Run one task and print its result.
async fn run_task(
    config: &Config,
    args: &Args,
    task: &str,
    input: Value,
    output: Option<PathBuf>,
    show_notes: bool,
) -> Result<()> {
    let mut note_rx = None;
    let note_sink: Arc<dyn NoteSink> = if show_notes {
        let (sink, rx) = ChannelNotes::new();
        note_rx = Some(rx);
        Arc::new(sink)
    } else {
        Arc::new(TracingNotes)
    };

    let registry = build_registry(config, note_sink)?;

    let spinner = (!args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Running {}", task));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = registry.dispatch(task, input).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let result = result.with_context(|| format!("Task {} failed", task))?;
    let rendered = serde_json::to_string_pretty(&result)?;

    if let Some(ref mut rx) = note_rx {
        println!("📝 Notes:");
        while let Ok(note) = rx.try_recv() {
            let tags: Vec<&str> = note.tags.iter().map(String::as_str).collect();
            println!("   [{}] {}", tags.join(", "), note.text);
        }
        println!();
    }

    println!("{}", rendered);

    if let Some(path) = output {
        std::fs::write(&path, &rendered)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
        info!("Result saved to {}", path.display());
    }

    Ok(())
}

/// Resolve the task input from --input or --message.
fn task_input(input: Option<String>, message: Option<String>) -> Result<Value> {
    match (input, message) {
        (Some(raw), _) => serde_json::from_str(&raw).context("--input is not valid JSON"),
        (None, Some(message)) => Ok(json!({ "message": message })),
        (None, None) => anyhow::bail!("Provide task input with --input or --message"),
    }
}

/// Wire the completion client, panel and registry from configuration.
fn build_registry(config: &Config, notes: Arc<dyn NoteSink>) -> Result<Registry> {
    let client = OllamaClient::new(OllamaConfig {
        ollama_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        max_tokens: config.model.max_tokens,
        timeout_seconds: config.model.timeout_seconds,
        api_key: config.model.api_key(),
    })?;

    let panel = PersonaPanel::new(Arc::new(client), notes, config.personas.clone())?
        .with_worker_timeout(config.pipeline.worker_timeout());

    reasoners::build_registry(&config.agent.router_prefix, Arc::new(panel))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
