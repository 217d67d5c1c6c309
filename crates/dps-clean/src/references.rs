//! Reference code collection
//!
//! Gathers every `icode` from the `reference*.csv` tables under the cleaned
//! root into one de-duplicated, sorted `reference_relation.csv`. The crawler
//! reads that file as the seed list of `file_metadata`.

use crate::cleaner::write_table;
use crate::tables::{Column, TableSpec};
use anyhow::{bail, Context, Result};
use dps_common::files::read_csv_column;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Name of the collected file, written at the cleaned root
pub const REFERENCE_FILE: &str = "reference_relation.csv";

/// Column holding the reference code
pub const ICODE_COLUMN: &str = "icode";

static REFERENCE_COLUMNS: &[Column] = &[Column::field(ICODE_COLUMN, ICODE_COLUMN)];

static REFERENCE_TABLE: TableSpec = TableSpec {
    name: "reference_relation",
    columns: REFERENCE_COLUMNS,
    rules: &[],
};

/// Outcome of a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSummary {
    pub files_read: usize,
    pub files_skipped: usize,
    pub icodes: usize,
    /// `None` when no code was found and nothing was written
    pub output: Option<PathBuf>,
}

/// Collect reference codes below `cleaned_dir`
#[instrument(skip_all, fields(cleaned_dir = %cleaned_dir.display()))]
pub fn collect_references(cleaned_dir: &Path, bom: bool) -> Result<ReferenceSummary> {
    if !cleaned_dir.is_dir() {
        bail!("Cleaned data directory {} does not exist", cleaned_dir.display());
    }
    let output = cleaned_dir.join(REFERENCE_FILE);

    let mut summary = ReferenceSummary::default();
    let mut icodes = BTreeSet::new();

    for entry in WalkDir::new(cleaned_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let path = entry.path();
        if path == output || !is_reference_table(&entry.file_name().to_string_lossy()) {
            continue;
        }

        match read_csv_column(path, ICODE_COLUMN) {
            Ok(values) => {
                debug!(file = %path.display(), values = values.len(), "Read reference table");
                summary.files_read += 1;
                icodes.extend(values);
            },
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping reference table");
                summary.files_skipped += 1;
            },
        }
    }

    summary.icodes = icodes.len();
    if icodes.is_empty() {
        warn!("No reference codes found, nothing written");
        return Ok(summary);
    }

    let rows: Vec<Vec<String>> = icodes.into_iter().map(|code| vec![code]).collect();
    write_table(&output, &REFERENCE_TABLE, &rows, bom)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        files_read = summary.files_read,
        files_skipped = summary.files_skipped,
        icodes = summary.icodes,
        output = %output.display(),
        "Reference codes collected"
    );
    summary.output = Some(output);
    Ok(summary)
}

fn is_reference_table(name: &str) -> bool {
    name.starts_with("reference") && name.ends_with(".csv")
}
