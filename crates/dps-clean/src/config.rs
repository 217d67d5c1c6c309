//! Cleaner configuration
//!
//! Read from `DPS_*` environment variables, overridable from the command
//! line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cleaner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanConfig {
    /// Root of the crawler's `{source}/` batch directories
    pub data_dir: PathBuf,
    /// Root of the `{domain}/` CSV output directories
    pub cleaned_dir: PathBuf,
    /// Prefix every CSV file with a UTF-8 byte order mark
    pub csv_bom: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            cleaned_dir: PathBuf::from("./cleaned_data"),
            csv_bom: true,
        }
    }
}

impl CleanConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            data_dir: std::env::var("DPS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cleaned_dir: std::env::var("DPS_CLEANED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cleaned_dir),
            csv_bom: std::env::var("DPS_CSV_BOM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.csv_bom),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            anyhow::bail!("DPS_DATA_DIR must not be empty");
        }
        if self.cleaned_dir.as_os_str().is_empty() {
            anyhow::bail!("DPS_CLEANED_DIR must not be empty");
        }
        Ok(())
    }

    /// Directory holding the batch files of one crawl source
    pub fn input_dir(&self, source: &str) -> PathBuf {
        self.data_dir.join(source)
    }

    /// Directory receiving the CSV tables of one domain
    pub fn output_dir(&self, domain: &str) -> PathBuf {
        self.cleaned_dir.join(domain)
    }
}
