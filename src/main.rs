use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use signdesk::config::{ConfigError, EditorConfig};
use signdesk::document::{HttpFetcher, LoadError};
use signdesk::notify::Notifier;
use signdesk::replay::{self, ReplayError, ReplayOutcome, ReplayScript};
use signdesk::submit::{CaptureSink, HttpSaveSink, SaveError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "signdesk", about = "PDF annotation and signature editor tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded editing session headlessly and emit the resulting payload.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON replay script.
    #[arg(long)]
    script: PathBuf,

    /// POST `save` events to this endpoint instead of capturing them.
    #[arg(long, env = "SIGNDESK_SAVE_URL")]
    save_url: Option<String>,

    /// Write the final payload here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args).await,
    }
}

async fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let config = EditorConfig::from_env()?;
    let script = ReplayScript::from_file(&args.script)?;
    let fetcher = HttpFetcher::new(config.timeouts)?;
    let (notifier, mut toasts) = Notifier::channel();

    let outcome: ReplayOutcome = match args.save_url.or_else(|| config.save_url.clone()) {
        Some(url) => {
            let sink = HttpSaveSink::new(url, config.timeouts)?;
            replay::run(script, config, fetcher, sink, notifier).await?
        }
        None => replay::run(script, config, fetcher, CaptureSink::new(), notifier).await?,
    };

    while let Ok(toast) = toasts.try_recv() {
        eprintln!("{toast}");
    }

    let json = serde_json::to_string_pretty(&outcome.payload)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            tracing::info!(path = %path.display(), locked = outcome.locked, "payload written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
