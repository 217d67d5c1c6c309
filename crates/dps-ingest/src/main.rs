//! DPS Ingest - pest reference crawler

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use dps_common::logging::{init_logging, LogConfig, LogLevel};
use dps_ingest::client::HttpFetcher;
use dps_ingest::config::CrawlConfig;
use dps_ingest::crawler;
use dps_ingest::extract::{self, ExtractSummary};
use dps_ingest::sources::{self, Endpoint, SeedOrigin, Source};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dps-ingest")]
#[command(author, version, about = "Pest reference site crawler")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one or more sources into JSON batch files
    Crawl {
        /// Sources to crawl, in order (see `sources`)
        #[arg(required_unless_present = "all")]
        sources: Vec<String>,

        /// Crawl every source in dependency order
        #[arg(long, conflicts_with = "sources")]
        all: bool,

        #[command(flatten)]
        overrides: CrawlOverrides,
    },

    /// Extract species ids from the pests batches into seed files
    ExtractIds {
        /// Data directory holding `pests/`
        #[arg(long, env = "DPS_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Ids per seed file
        #[arg(long, default_value_t = dps_common::batch::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// List registered sources
    Sources,
}

#[derive(Args, Debug)]
struct CrawlOverrides {
    /// Site root
    #[arg(long, env = "DPS_BASE_URL")]
    base_url: Option<String>,

    /// Output data directory
    #[arg(long, env = "DPS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Cleaned data directory (reference code seeds)
    #[arg(long, env = "DPS_CLEANED_DIR")]
    cleaned_dir: Option<PathBuf>,

    /// Concurrent seed sequences
    #[arg(short, long, env = "DPS_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Records per batch file
    #[arg(short, long, env = "DPS_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "DPS_REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

impl CrawlOverrides {
    fn apply(self, mut config: CrawlConfig) -> Result<CrawlConfig> {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(cleaned_dir) = self.cleaned_dir {
            config.cleaned_dir = cleaned_dir;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if self.insecure {
            config.accept_invalid_certs = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("dps-ingest")
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Crawl {
            sources: names,
            all,
            overrides,
        } => {
            let selected = select_sources(&names, all)?;
            let config = overrides.apply(CrawlConfig::from_env()?)?;
            let fetcher = Arc::new(HttpFetcher::new(&config)?);

            let mut failed = Vec::new();
            for source in selected {
                let summary = match crawler::crawl_source(source, &config, fetcher.clone()).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        error!(source = source.name, error = %format!("{:#}", e), "Source failed");
                        failed.push(source.name);
                        continue;
                    },
                };
                println!(
                    "{}: {} seeds ({} failed), {} records in {} files",
                    summary.source,
                    summary.seeds,
                    summary.failed,
                    summary.batch.records_written,
                    summary.batch.files.len()
                );
                if summary.interrupted {
                    info!("Crawl interrupted, remaining sources skipped");
                    break;
                }

                // Every per-species source is seeded from the pests batches
                if all && source.name == sources::PESTS.name {
                    match extract::extract_species_ids(&config.data_dir, config.batch_size) {
                        Ok(extracted) => print_extract_summary(&extracted),
                        Err(e) => {
                            error!(error = %e, "Species id extraction failed");
                            failed.push("extract-ids");
                        },
                    }
                }
            }
            if !failed.is_empty() {
                bail!("{} source(s) failed: {}", failed.len(), failed.join(", "));
            }
        },
        Command::ExtractIds {
            data_dir,
            batch_size,
        } => {
            let summary = extract::extract_species_ids(&data_dir, batch_size)?;
            print_extract_summary(&summary);
        },
        Command::Sources => {
            for source in sources::ALL {
                println!(
                    "{:<22} {:<7} {:<14} {}",
                    source.name,
                    shape_label(source),
                    seed_label(source),
                    source.description
                );
            }
        },
    }

    info!("Ingestion complete");
    Ok(())
}

fn select_sources(names: &[String], all: bool) -> Result<Vec<&'static Source>> {
    if all {
        return Ok(sources::ALL.to_vec());
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match sources::find(name) {
            Some(source) => selected.push(source),
            None => bail!(
                "Unknown source '{}'. Known sources: {}",
                name,
                sources::names().collect::<Vec<_>>().join(", ")
            ),
        }
    }
    Ok(selected)
}

fn print_extract_summary(summary: &ExtractSummary) {
    println!(
        "{} species ids in {} files ({} records without id)",
        summary.batch.records_written,
        summary.batch.files.len(),
        summary.records_skipped
    );
}

fn shape_label(source: &Source) -> &'static str {
    match source.endpoint {
        Endpoint::Paged(_) => "paged",
        Endpoint::Detail { .. } => "detail",
    }
}

fn seed_label(source: &Source) -> &'static str {
    match source.seeds {
        SeedOrigin::Unseeded => "none",
        SeedOrigin::SpeciesIds { .. } => "species ids",
        SeedOrigin::BatchField { .. } => "batch field",
        SeedOrigin::CsvColumn { .. } => "csv column",
    }
}
