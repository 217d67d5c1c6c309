//! Crawler configuration
//!
//! Loaded from `DPS_*` environment variables; CLI flags override individual
//! values after loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default site root
pub const DEFAULT_BASE_URL: &str = "http://www.pestchina.com";

/// Default number of seed sequences in flight at once
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Browser user agent the site expects on its XHR endpoints
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

/// Crawler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Site root every endpoint path is appended to
    pub base_url: String,
    /// Root of `{source}/` batch directories and `species_id/` seed files
    pub data_dir: PathBuf,
    /// Cleaner output root, read for `reference_relation.csv` seeds
    pub cleaned_dir: PathBuf,
    /// Maximum number of seed sequences running concurrently
    pub concurrency: usize,
    /// Records per output batch file
    pub batch_size: usize,
    /// Timeout for a single request in seconds
    pub request_timeout_secs: u64,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("./data"),
            cleaned_dir: PathBuf::from("./cleaned_data"),
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: dps_common::batch::DEFAULT_BATCH_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            base_url: std::env::var("DPS_BASE_URL").unwrap_or(defaults.base_url),
            data_dir: std::env::var("DPS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cleaned_dir: std::env::var("DPS_CLEANED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cleaned_dir),
            concurrency: std::env::var("DPS_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.concurrency),
            batch_size: std::env::var("DPS_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
            request_timeout_secs: std::env::var("DPS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            accept_invalid_certs: std::env::var("DPS_ACCEPT_INVALID_CERTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.accept_invalid_certs),
            user_agent: std::env::var("DPS_USER_AGENT").unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("DPS_BASE_URL must not be empty");
        }
        if self.concurrency == 0 {
            anyhow::bail!("DPS_CONCURRENCY must be greater than 0");
        }
        if self.batch_size == 0 {
            anyhow::bail!("DPS_BATCH_SIZE must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("DPS_REQUEST_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the batch files of one source
    pub fn source_dir(&self, source: &str) -> PathBuf {
        self.data_dir.join(source)
    }

    /// Directory holding `species_ids_{n}.json` seed files
    pub fn species_id_dir(&self) -> PathBuf {
        self.data_dir.join("species_id")
    }
}
