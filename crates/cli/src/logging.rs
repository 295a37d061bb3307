use anyhow::Result;
use jobboard_core::JobBoardConfig;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI.
///
/// Logs go to stderr so command output on stdout stays machine readable.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &JobBoardConfig) -> Result<()> {
    if config.log.file_enabled {
        init_file_logging(&config.log.level, &config.data_dir)
    } else {
        init_stderr_logging(&config.log.level);
        Ok(())
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let level = level.to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("jobboard={level},jobboard_http={level},jobboard_core={level}").into()
    })
}

fn init_file_logging(level: &str, data_dir: &Path) -> Result<()> {
    let log_file_path = log_file_path(data_dir);
    if let Some(parent) = log_file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn init_stderr_logging(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("logs").join("jobboard.log")
}
