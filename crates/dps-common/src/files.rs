//! Discovery of numbered files such as `species_ids_3.json`
//! or `pests_batch_12.json`

use crate::error::{DpsError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Byte order mark some CSV writers put in front of the header
pub const UTF8_BOM: &str = "\u{feff}";

/// A file whose name is `{prefix}_{number}.{extension}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedFile {
    pub number: u64,
    pub path: PathBuf,
}

/// Parse the number out of `{prefix}_{number}.{extension}`
pub fn file_number(name: &str, prefix: &str, extension: &str) -> Option<u64> {
    name.strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(extension)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

/// List `{prefix}_{n}.{extension}` files in `dir`, sorted by `n`.
///
/// Names that do not match exactly (e.g. `pests_batch_x.json`) are ignored.
/// A missing directory is an error; unreadable entries are skipped.
pub fn numbered_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<NumberedFile>> {
    let mut files: Vec<NumberedFile> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = file_number(name.to_str()?, prefix, extension)?;
            Some(NumberedFile {
                number,
                path: entry.path(),
            })
        })
        .collect();

    files.sort_by_key(|f| f.number);
    Ok(files)
}

/// Read a file holding one JSON array.
///
/// Any other top-level value is a parse error.
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    let bytes = std::fs::read(path)?;
    match serde_json::from_slice(&bytes)? {
        Value::Array(items) => Ok(items),
        _ => Err(DpsError::parse(format!("{} does not hold a JSON array", path.display()))),
    }
}

/// Trimmed, non-empty values of one CSV column.
///
/// The column is looked up by header name, ignoring a leading byte order
/// mark. A file without that column is a parse error; malformed rows are
/// skipped with a warning.
pub fn read_csv_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim_start_matches(UTF8_BOM).trim() == column)
        .ok_or_else(|| DpsError::parse(format!("{} has no '{}' column", path.display(), column)))?;

    let mut values = Vec::new();
    for row in reader.records() {
        match row {
            Ok(row) => {
                if let Some(value) = row.get(index).map(str::trim).filter(|v| !v.is_empty()) {
                    values.push(value.to_string());
                }
            },
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping malformed CSV row"),
        }
    }
    Ok(values)
}
