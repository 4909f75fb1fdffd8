//! Curie server and command-line client.
//!
//! Usage:
//!   curie                         # serve the web UI (default)
//!   curie serve --port 8080 --config curie.toml
//!   curie report --topic "Dark matter" --quick
//!   curie agents
//!
//! # Environment Variables
//!
//! - `GROQ_API_KEY` / `OPENAI_API_KEY` - model provider keys
//! - `BRAVE_API_KEY` - key passed to the web search tool server
//! - `CURIE_BIND_ADDR`, `CURIE_PORT`, `CURIE_CONFIG` - defaults for the flags
//!
//! A `.env` file in the working directory is loaded first.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use curie_agents::{Orchestrator, ReportGenerator, ReportStyle, ResearchRequest, build_team};
use curie_web::page::{DEFAULT_DEPTH, DEFAULT_FOCUS, DEFAULT_SCOPE, DEFAULT_TOPIC};
use curie_web::{AppConfig, AppState, serve};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "curie", version, about = "AI Science Research Assistant")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Serve the web UI and JSON API")]
    Serve(ServeArgs),
    #[command(about = "Generate one report and print it")]
    Report(ReportArgs),
    #[command(about = "List the configured agents")]
    Agents {
        #[arg(short, long, env = "CURIE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Bind address [default: 127.0.0.1]
    #[arg(short, long, env = "CURIE_BIND_ADDR")]
    bind: Option<String>,

    /// Port to listen on [default: 7860]
    #[arg(short, long, env = "CURIE_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "CURIE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[arg(long, default_value = DEFAULT_TOPIC)]
    topic: String,

    #[arg(long, default_value = DEFAULT_SCOPE)]
    scope: String,

    #[arg(long, default_value = DEFAULT_DEPTH)]
    depth: String,

    #[arg(long = "focus", default_value = DEFAULT_FOCUS)]
    focus_areas: String,

    /// Ask one question instead of requesting the full report
    #[arg(long)]
    quick: bool,

    #[arg(short, long, env = "CURIE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,curie_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => run_server(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Agents { config } => list_agents(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            AppConfig::from_file(path)
        }
        None => {
            info!("Using default configuration");
            Ok(AppConfig::default())
        }
    }
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;

    // CLI flag > env var > config file > default
    let host = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);

    if host == "0.0.0.0" {
        warn!(
            "Server binding to 0.0.0.0; the UI and API are reachable from every network \
             interface and have no authentication."
        );
    }

    let team = build_team(&config.team_config())?;
    let mut state = AppState::new(Arc::new(team));
    if let Some(secs) = config.server.report_timeout_secs {
        state = state.with_report_timeout(Duration::from_secs(secs));
    }

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    serve(Arc::new(state), addr).await
}

async fn run_report(args: ReportArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let team: Arc<dyn Orchestrator> = Arc::new(build_team(&config.team_config())?);

    let mut generator = ReportGenerator::new(team);
    if let Some(secs) = config.server.report_timeout_secs {
        generator = generator.with_timeout(Duration::from_secs(secs));
    }

    let request = ResearchRequest::new(args.topic, args.scope, args.depth, args.focus_areas);
    let style = if args.quick {
        ReportStyle::Quick
    } else {
        ReportStyle::Full
    };

    println!("{}", generator.generate_with(&request, style).await);
    generator.shutdown().await;
    Ok(())
}

fn list_agents(config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let team = config.team_config();
    team.validate()?;

    println!("Process: {:?}", team.process);
    for profile in &team.agents {
        println!("{} ({})", profile.name, profile.id);
        println!("  model: {}", profile.model);
        if let Some(ref tool) = profile.tool {
            println!("  tool:  {}", tool.command);
        }
        println!("  role:  {}", profile.instructions);
    }
    Ok(())
}
