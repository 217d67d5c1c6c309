//! Species id extraction
//!
//! Collects the `TP_GUID` of every record in the `pests` batches and writes
//! them as `species_id/species_ids_{n}.json`, the seed files of every
//! per-species source.

use crate::seeds::SPECIES_ID_PREFIX;
use crate::sources::PESTS;
use dps_common::batch::{BatchBuffer, BatchSummary};
use dps_common::files::{numbered_files, read_json_array};
use dps_common::record::value_text;
use dps_common::Result;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Field of a pest record holding the species GUID
pub const SPECIES_ID_FIELD: &str = "TP_GUID";

/// Outcome of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files_read: usize,
    pub files_skipped: usize,
    pub records_skipped: u64,
    pub batch: BatchSummary,
}

/// Extract species ids from `{data_dir}/pests` into `{data_dir}/species_id`
#[instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn extract_species_ids(data_dir: &Path, batch_size: usize) -> Result<ExtractSummary> {
    let input = data_dir.join(PESTS.name);
    let files = numbered_files(&input, &PESTS.batch_prefix(), "json")?;
    let sink: BatchBuffer<String> = BatchBuffer::new(data_dir.join("species_id"), SPECIES_ID_PREFIX, batch_size)?;

    let mut summary = ExtractSummary::default();
    for file in &files {
        let records = match read_json_array(&file.path) {
            Ok(records) => records,
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Skipping unreadable pests batch");
                summary.files_skipped += 1;
                continue;
            },
        };
        summary.files_read += 1;

        for record in records {
            match record.get(SPECIES_ID_FIELD).and_then(value_text) {
                Some(id) if !id.trim().is_empty() => {
                    if let Err(e) = sink.append(id.trim().to_string()) {
                        warn!(error = %e, "Failed to buffer species id");
                    }
                },
                _ => {
                    warn!(file = %file.path.display(), "Skipping pest record without {}", SPECIES_ID_FIELD);
                    summary.records_skipped += 1;
                },
            }
        }
    }

    summary.batch = sink.finalize()?;
    info!(
        files = summary.files_read,
        ids = summary.batch.records_written,
        skipped = summary.records_skipped,
        "Species id extraction complete"
    );
    Ok(summary)
}
