//! DPS Clean Library
//!
//! Flattens the crawler's JSON batch files into relational CSV tables keyed
//! by species GUIDs and reference codes.
//!
//! # Pipeline
//!
//! - [`domains`]: column tables and record rules of every cleaning domain
//! - [`tables`]: the declarative table model and row builder
//! - [`values`]: GUID, timestamp, integer and flag parsing
//! - [`cleaner`]: batch file to CSV table conversion with skip reporting
//! - [`references`]: collects reference codes for the `file_metadata` crawl
//!
//! # Example
//!
//! ```no_run
//! use dps_clean::config::CleanConfig;
//! use dps_clean::{cleaner, domains};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = CleanConfig::from_env()?;
//!     let summary = cleaner::clean_domain(&domains::META, &config)?;
//!     println!("{} rows, {} skipped", summary.rows_written, summary.records_skipped);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod cleaner;
pub mod config;
pub mod domains;
pub mod references;
pub mod tables;
pub mod values;

pub use cleaner::{clean_domain, CleanSummary};
pub use config::CleanConfig;
pub use references::{collect_references, ReferenceSummary};
pub use tables::{Domain, RecordVerdict, TableSpec};
