//! Crawl orchestrator
//!
//! Runs every seed of one source through the request driver with bounded
//! concurrency. All sequences share one batch buffer, so the source's batch
//! files are numbered in a single counter namespace. On Ctrl+C or SIGTERM no
//! further sequences are started, in-flight ones are dropped, and the buffer
//! is finalized before returning.

use crate::client::PageFetcher;
use crate::config::CrawlConfig;
use crate::driver::RequestDriver;
use crate::progress::create_seed_progress;
use crate::seeds::load_seeds;
use crate::sources::Source;
use anyhow::{Context, Result};
use dps_common::batch::{BatchBuffer, BatchSummary};
use dps_common::Record;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, instrument, warn};

/// Outcome of crawling one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub source: String,
    pub seeds: usize,
    pub completed: usize,
    pub failed: usize,
    /// Records handed to the batch buffer
    pub records: u64,
    pub batch: BatchSummary,
    /// The run was cut short by a shutdown signal
    pub interrupted: bool,
}

/// Crawl `source` until done or until Ctrl+C / SIGTERM
pub async fn crawl_source(
    source: &'static Source,
    config: &CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<CrawlSummary> {
    crawl_source_until(source, config, fetcher, shutdown_signal()).await
}

/// Crawl `source`, stopping early once `shutdown` resolves
#[instrument(skip_all, fields(source = source.name))]
pub async fn crawl_source_until<S>(
    source: &'static Source,
    config: &CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    shutdown: S,
) -> Result<CrawlSummary>
where
    S: Future<Output = ()>,
{
    config.validate()?;

    let seeds = load_seeds(source, config)
        .with_context(|| format!("Failed to load seeds for source '{}'", source.name))?;
    let output_dir = config.source_dir(source.name);
    let sink: BatchBuffer<Record> = BatchBuffer::new(output_dir.clone(), source.batch_prefix(), config.batch_size)
        .with_context(|| format!("Failed to prepare output directory {}", output_dir.display()))?;
    let driver = RequestDriver::new(fetcher, config.base_url.clone());

    info!(
        seeds = seeds.len(),
        concurrency = config.concurrency,
        batch_size = config.batch_size,
        output = %output_dir.display(),
        "Starting crawl"
    );

    let progress = create_seed_progress(seeds.len() as u64, source.description);
    let mut summary = CrawlSummary {
        source: source.name.to_string(),
        seeds: seeds.len(),
        ..CrawlSummary::default()
    };

    let run = async {
        let mut outcomes = stream::iter(seeds.iter())
            .map(|seed| driver.drive_seed(source, seed, &sink))
            .buffer_unordered(config.concurrency);

        while let Some(outcome) = outcomes.next().await {
            summary.records += outcome.records;
            if outcome.is_completed() {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
            progress.inc(1);
        }
    };

    let interrupted = tokio::select! {
        _ = run => false,
        _ = shutdown => {
            warn!("Shutdown signal received, flushing buffered records");
            true
        }
    };
    summary.interrupted = interrupted;

    if interrupted {
        progress.abandon_with_message(format!("{} interrupted", source.name));
    } else {
        progress.finish_with_message(format!("{} done", source.name));
    }

    summary.batch = match sink.finalize() {
        Ok(batch) => batch,
        Err(e) => {
            error!(error = %e, "Failed to write final batch");
            BatchSummary::default()
        },
    };

    info!(
        seeds = summary.seeds,
        completed = summary.completed,
        failed = summary.failed,
        records = summary.records,
        files = summary.batch.files.len(),
        dropped = summary.batch.records_dropped,
        interrupted = summary.interrupted,
        "Crawl finished"
    );
    Ok(summary)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
///
/// If a handler cannot be installed that branch never resolves.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
