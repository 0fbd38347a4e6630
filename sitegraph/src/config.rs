//! Configuration loading.
//!
//! The file is read once at startup. Only `timeout` (the idle timeout, in
//! seconds) is required; every other key has a default.

use serde::{Deserialize, Serialize};
use sitegraph_core::CrawlOptions;
use sitegraph_scanner::HttpFetcherOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Idle timeout in seconds. A crawl stops once nothing happened for
    /// this long.
    pub timeout: u64,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// How often the engine checks for idleness
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Upper bound on in-flight page fetches per crawl
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_listen() -> String {
    "0.0.0.0:1234".to_string()
}

fn default_check_interval_ms() -> u64 {
    1000
}

fn default_max_concurrency() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("sitegraph/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load and validate a config file. `~` in the path is expanded.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = expand_path(path);
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Invalid("timeout must be greater than 0".into()));
        }
        if self.crawl.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "crawl.check_interval_ms must be greater than 0".into(),
            ));
        }
        if self.crawl.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "crawl.max_concurrency must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.crawl.check_interval_ms)
    }

    pub fn fetcher_options(&self) -> HttpFetcherOptions {
        HttpFetcherOptions {
            timeout: Duration::from_secs(self.crawl.request_timeout_secs),
            user_agent: self.crawl.user_agent.clone(),
            accept_invalid_certs: self.crawl.accept_invalid_certs,
        }
    }

    pub fn crawl_options(&self, url: &str, max_pages: usize) -> CrawlOptions {
        CrawlOptions {
            url: url.to_string(),
            max_pages,
            max_concurrency: self.crawl.max_concurrency,
            idle_timeout: self.idle_timeout(),
            check_interval: self.check_interval(),
        }
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    Path::new(shellexpand::tilde(path).as_ref()).to_path_buf()
}
