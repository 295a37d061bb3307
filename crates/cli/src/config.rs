//! CLI configuration utilities

use anyhow::{Context, Result};
use jobboard_core::JobBoardConfig;
use std::path::{Path, PathBuf};

/// Values given on the command line, applied over the loaded config
#[derive(Debug, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub no_file_log: bool,
}

/// Load the configuration and apply command-line overrides.
///
/// An explicit config file must exist; the default one under the data
/// directory is only read when present.
pub fn load(overrides: Overrides) -> Result<JobBoardConfig> {
    let data_dir = overrides
        .data_dir
        .clone()
        .unwrap_or_else(|| JobBoardConfig::default().data_dir);

    let config_file = overrides.config_file.clone().or_else(|| {
        let path = JobBoardConfig::default_path(&data_dir);
        path.exists().then_some(path)
    });

    let mut config = JobBoardConfig::load(config_file.as_deref()).with_context(|| {
        config_file.as_ref().map_or_else(
            || "Failed to load configuration".to_string(),
            |path| format!("Failed to load configuration from {}", path.display()),
        )
    })?;

    apply(&mut config, overrides);
    Ok(config)
}

fn apply(config: &mut JobBoardConfig, overrides: Overrides) {
    if let Some(data_dir) = overrides.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(base_url) = overrides.base_url {
        config.api.base_url = base_url;
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.api.timeout_secs = timeout;
    }
    if let Some(level) = overrides.log_level {
        config.log.level = level;
    }
    if overrides.no_file_log {
        config.log.file_enabled = false;
    }
}

/// Write a default configuration file rooted at `data_dir`
pub fn generate_default_config(path: &Path, data_dir: &Path) -> Result<()> {
    let config = JobBoardConfig {
        data_dir: data_dir.to_path_buf(),
        ..JobBoardConfig::default()
    };
    config
        .save(path)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))
}
