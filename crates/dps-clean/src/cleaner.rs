//! JSON batch to CSV table cleaner
//!
//! Each `{source}_batch_{n}.json` of a domain's source becomes one
//! `{table}_batch_{n}.csv` per table in `{cleaned_dir}/{domain}/`. Records
//! failing a table's rules are skipped with a warning; their siblings are
//! still processed. Child rows are expanded from nested lists and carry the
//! parent's key whether or not the parent row itself was kept.

use crate::config::CleanConfig;
use crate::tables::{Domain, RecordVerdict, TableSpec};
use anyhow::{bail, Context, Result};
use dps_common::files::{numbered_files, read_json_array, UTF8_BOM};
use dps_common::Record;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Counters of one domain run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub domain: String,
    pub files_read: usize,
    pub files_skipped: usize,
    pub records_read: u64,
    /// Primary table rows written
    pub rows_written: u64,
    /// Source records that produced no primary row
    pub records_skipped: u64,
    pub child_rows_written: u64,
    pub child_rows_skipped: u64,
    /// Date cells blanked because they could not be parsed
    pub date_warnings: u64,
    /// Optional GUID cells blanked because they were malformed
    pub id_warnings: u64,
    pub write_failures: usize,
    pub outputs: Vec<PathBuf>,
}

/// Rows of one table for one input batch
#[derive(Debug, Clone)]
pub struct TableRows {
    pub table: TableSpec,
    /// Always written, even when empty
    pub primary: bool,
    pub rows: Vec<Vec<String>>,
}

/// Clean every batch of `domain`
#[instrument(skip_all, fields(domain = domain.name))]
pub fn clean_domain(domain: &Domain, config: &CleanConfig) -> Result<CleanSummary> {
    let input = config.input_dir(domain.source);
    if !input.is_dir() {
        bail!("Input directory {} does not exist", input.display());
    }
    let files = numbered_files(&input, &domain.input_prefix(), "json")
        .with_context(|| format!("Failed to list {}", input.display()))?;

    let output = config.output_dir(domain.name);
    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    info!(files = files.len(), input = %input.display(), output = %output.display(), "Cleaning domain");

    let mut summary = CleanSummary {
        domain: domain.name.to_string(),
        ..CleanSummary::default()
    };

    for file in &files {
        let values = match read_json_array(&file.path) {
            Ok(values) => values,
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Skipping unreadable batch file");
                summary.files_skipped += 1;
                continue;
            },
        };
        summary.files_read += 1;

        for table in clean_batch(domain, values, &mut summary) {
            if table.rows.is_empty() && !table.primary {
                continue;
            }
            let path = output.join(format!("{}_batch_{}.csv", table.table.name, file.number));
            match write_table(&path, &table.table, &table.rows, config.csv_bom) {
                Ok(()) => summary.outputs.push(path),
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Failed to write CSV table");
                    summary.write_failures += 1;
                },
            }
        }
    }

    info!(
        files_read = summary.files_read,
        files_skipped = summary.files_skipped,
        records = summary.records_read,
        rows = summary.rows_written,
        skipped = summary.records_skipped,
        child_rows = summary.child_rows_written,
        child_skipped = summary.child_rows_skipped,
        date_warnings = summary.date_warnings,
        id_warnings = summary.id_warnings,
        outputs = summary.outputs.len(),
        "Domain cleaned"
    );
    Ok(summary)
}

/// Turn one batch of raw records into the rows of every table of `domain`,
/// primary table first
pub fn clean_batch(domain: &Domain, values: Vec<Value>, summary: &mut CleanSummary) -> Vec<TableRows> {
    let mut primary = TableRows {
        table: domain.table,
        primary: true,
        rows: Vec::new(),
    };
    let mut children: Vec<TableRows> = domain
        .children
        .iter()
        .map(|child| TableRows {
            table: child.table,
            primary: false,
            rows: Vec::new(),
        })
        .collect();

    for value in values {
        summary.records_read += 1;
        if !value.is_object() {
            warn!(table = domain.table.name, "Skipping non-object record");
            summary.records_skipped += 1;
            continue;
        }
        let record = Record::from_value(value);

        match domain.table.verdict(&record) {
            RecordVerdict::Keep => {
                let row_id = primary.rows.len() as u64 + 1;
                let row = domain.table.build_row(&record, None, row_id);
                summary.date_warnings += row.date_warnings;
                summary.id_warnings += row.id_warnings;
                summary.rows_written += 1;
                primary.rows.push(row.cells);
            },
            RecordVerdict::Skip(reason) => {
                warn!(table = domain.table.name, %reason, "Skipping record");
                summary.records_skipped += 1;
            },
        }

        for (child, rows) in domain.children.iter().zip(children.iter_mut()) {
            for entry in record.child(child.key) {
                match child.table.verdict(entry) {
                    RecordVerdict::Keep => {
                        let row_id = rows.rows.len() as u64 + 1;
                        let row = child.table.build_row(entry, Some(&record), row_id);
                        summary.date_warnings += row.date_warnings;
                        summary.id_warnings += row.id_warnings;
                        summary.child_rows_written += 1;
                        rows.rows.push(row.cells);
                    },
                    RecordVerdict::Skip(reason) => {
                        warn!(table = child.table.name, %reason, "Skipping child record");
                        summary.child_rows_skipped += 1;
                    },
                }
            }
        }
    }

    std::iter::once(primary).chain(children).collect()
}

/// Write `rows` under the table's header row
pub fn write_table(path: &Path, table: &TableSpec, rows: &[Vec<String>], bom: bool) -> dps_common::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    if bom {
        file.write_all(UTF8_BOM.as_bytes())?;
    }

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(table.headers())?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
