//! Job board CLI

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Command-line client for the job board API")]
#[command(version)]
struct Cli {
    /// Set logging level (defaults to the configured level)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Data directory for the session, config and logs
    #[arg(short = 'd', long, global = true, env = "JOBBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data-dir>/config.json when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(short = 'u', long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = config::Overrides {
        data_dir: cli.data_dir,
        config_file: cli.config,
        base_url: cli.base_url,
        timeout_secs: cli.timeout,
        log_level: cli.log_level.map(|level| Level::from(level).to_string()),
        no_file_log: cli.no_file_log,
    };
    let config = config::load(overrides)?;

    logging::init_logging(&config)?;
    debug!(
        base_url = %config.api.base_url,
        data_dir = %config.data_dir.display(),
        "Starting job board CLI"
    );

    if let Err(e) = cli.command.execute(config).await {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
