//! DPS Ingest Library
//!
//! Crawls the pest reference site's JSON endpoints and stores every response
//! record in fixed-size JSON batch files.
//!
//! # Pipeline
//!
//! - [`sources`]: declarative registry of endpoints, seed origins and field tables
//! - [`seeds`]: loads the seed identifiers a source is crawled for
//! - [`driver`]: drives one seed's paginated request sequence
//! - [`crawler`]: runs all seeds of a source concurrently into one batch buffer
//! - [`extract`]: derives the species id seed files from the `pests` batches
//!
//! # Example
//!
//! ```no_run
//! use dps_ingest::client::HttpFetcher;
//! use dps_ingest::config::CrawlConfig;
//! use dps_ingest::{crawler, sources};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CrawlConfig::from_env()?;
//!     let fetcher = Arc::new(HttpFetcher::new(&config)?);
//!     let summary = crawler::crawl_source(&sources::PESTS, &config, fetcher).await?;
//!     println!("{} records", summary.records);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod client;
pub mod config;
pub mod crawler;
pub mod driver;
pub mod extract;
pub mod progress;
pub mod seeds;
pub mod sources;

pub use client::{FetchRequest, HttpFetcher, PageFetcher};
pub use config::CrawlConfig;
pub use crawler::{crawl_source, crawl_source_until, CrawlSummary};
pub use driver::{RequestDriver, Seed, SeedOutcome};
