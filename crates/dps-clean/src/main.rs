//! DPS Clean - JSON batch to CSV table cleaner

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use dps_clean::config::CleanConfig;
use dps_clean::domains;
use dps_clean::tables::Domain;
use dps_clean::{cleaner, references, CleanSummary};
use dps_common::logging::{init_logging, LogConfig, LogLevel};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dps-clean")]
#[command(author, version, about = "Pest reference data cleaner")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the named domains
    Run {
        /// Domains to clean (see `domains`)
        #[arg(required = true)]
        domains: Vec<String>,

        #[command(flatten)]
        overrides: CleanOverrides,
    },

    /// Clean every domain, continuing past failing ones
    All {
        #[command(flatten)]
        overrides: CleanOverrides,
    },

    /// Collect reference codes into reference_relation.csv
    CollectReferences {
        #[command(flatten)]
        overrides: CleanOverrides,
    },

    /// List cleaning domains and their tables
    Domains,
}

#[derive(Args, Debug)]
struct CleanOverrides {
    /// Crawler output directory
    #[arg(long, env = "DPS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Cleaned CSV output directory
    #[arg(long, env = "DPS_CLEANED_DIR")]
    cleaned_dir: Option<PathBuf>,

    /// Write CSV files without a byte order mark
    #[arg(long)]
    no_bom: bool,
}

impl CleanOverrides {
    fn apply(self, mut config: CleanConfig) -> Result<CleanConfig> {
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(cleaned_dir) = self.cleaned_dir {
            config.cleaned_dir = cleaned_dir;
        }
        if self.no_bom {
            config.csv_bom = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("dps-clean")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Run {
            domains: names,
            overrides,
        } => {
            let selected = select_domains(&names)?;
            let config = overrides.apply(CleanConfig::from_env()?)?;
            for domain in selected {
                let summary = cleaner::clean_domain(domain, &config)?;
                print_summary(&summary);
            }
        },
        Command::All { overrides } => {
            let config = overrides.apply(CleanConfig::from_env()?)?;
            let mut failed = Vec::new();
            for domain in domains::ALL {
                match cleaner::clean_domain(domain, &config) {
                    Ok(summary) => print_summary(&summary),
                    Err(e) => {
                        error!(domain = domain.name, error = %e, "Domain failed");
                        failed.push(domain.name);
                    },
                }
            }
            if !failed.is_empty() {
                bail!("{} domain(s) failed: {}", failed.len(), failed.join(", "));
            }
        },
        Command::CollectReferences { overrides } => {
            let config = overrides.apply(CleanConfig::from_env()?)?;
            let summary = references::collect_references(&config.cleaned_dir, config.csv_bom)?;
            match &summary.output {
                Some(path) => println!(
                    "{} reference codes from {} files written to {}",
                    summary.icodes,
                    summary.files_read,
                    path.display()
                ),
                None => println!("No reference codes found"),
            }
        },
        Command::Domains => {
            for domain in domains::ALL {
                println!("{:<22} {:<16} {}", domain.name, domain.source, table_list(domain));
            }
        },
    }

    info!("Cleaning complete");
    Ok(())
}

fn select_domains(names: &[String]) -> Result<Vec<&'static Domain>> {
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match domains::find(name) {
            Some(domain) => selected.push(domain),
            None => bail!(
                "Unknown domain '{}'. Known domains: {}",
                name,
                domains::names().collect::<Vec<_>>().join(", ")
            ),
        }
    }
    Ok(selected)
}

fn table_list(domain: &Domain) -> String {
    domain.tables().map(|t| t.name).collect::<Vec<_>>().join(", ")
}

fn print_summary(summary: &CleanSummary) {
    println!(
        "{}: {} rows written, {} records skipped, {} child rows, {} files ({} unreadable)",
        summary.domain,
        summary.rows_written,
        summary.records_skipped,
        summary.child_rows_written,
        summary.files_read,
        summary.files_skipped
    );
}
