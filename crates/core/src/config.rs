//! Configuration management for the job board client

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `JOBBOARD_API__BASE_URL`
pub const ENV_PREFIX: &str = "JOBBOARD";

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBoardConfig {
    /// Backend API configuration
    pub api: ApiConfig,

    /// Dashboard cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Directory for persisted session tokens and log files
    pub data_dir: PathBuf,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    pub base_url: String,

    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,

    /// Refresh the access token when it expires within this many seconds
    pub refresh_horizon_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Dashboard cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached dashboard data in seconds
    pub ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Also write logs to `<data_dir>/logs/jobboard.log`
    pub file_enabled: bool,
}

impl Default for JobBoardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            log: LogConfig::default(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jobboard"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            refresh_horizon_secs: 300,
            user_agent: format!("jobboard-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn refresh_horizon(&self) -> Duration {
        Duration::from_secs(self.refresh_horizon_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl JobBoardConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be parsed
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default(
                "api.refresh_horizon_secs",
                defaults.api.refresh_horizon_secs,
            )?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .set_default("cache.ttl_secs", defaults.cache.ttl_secs)?
            .set_default("log.level", defaults.log.level)?
            .set_default("log.file_enabled", defaults.log.file_enabled)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?;

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Write the configuration as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default location of the config file inside the data directory
    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.json")
    }
}
