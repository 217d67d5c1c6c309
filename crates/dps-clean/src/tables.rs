//! Declarative CSV table specs
//!
//! A [`TableSpec`] lists the output columns of one CSV table in header
//! order together with the [`Rule`]s a source record must pass before a row
//! is written for it. A [`Domain`] ties a crawl source to its primary table
//! and to the child tables expanded from nested lists.

use crate::values::{is_truthy, is_uuid, normalize_datetime, parse_datetime, parse_integer};
use dps_common::Record;
use thiserror::Error;
use tracing::warn;

/// Where a column's cell comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Source field as text, empty when missing or null
    Field(&'static str),
    /// Timestamp normalized to `YYYY-MM-DD HH:MM:SS`, empty when unparseable
    Date(&'static str),
    /// `true` / `false`
    Bool(&'static str),
    /// Integer, empty when the value is not one
    Int(&'static str),
    /// GUID kept only when well-formed
    OptionalUuid(&'static str),
    /// Fresh random GUID per row
    GeneratedUuid,
    /// Row number within the output file, from 1
    RowId,
    /// Always empty, filled in by the database
    Empty,
    /// Field of the parent record, for child table foreign keys
    Parent(&'static str),
}

/// One output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub source: ColumnSource,
}

impl Column {
    pub const fn field(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Field(key),
        }
    }

    pub const fn date(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Date(key),
        }
    }

    pub const fn flag(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Bool(key),
        }
    }

    pub const fn int(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Int(key),
        }
    }

    pub const fn optional_uuid(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::OptionalUuid(key),
        }
    }

    pub const fn parent(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Parent(key),
        }
    }

    pub const fn generated_uuid(name: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::GeneratedUuid,
        }
    }

    pub const fn row_id(name: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::RowId,
        }
    }

    pub const fn empty(name: &'static str) -> Self {
        Self {
            name,
            source: ColumnSource::Empty,
        }
    }
}

/// A check a source record has to pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field holds a well-formed GUID
    Uuid(&'static str),
    /// Field is present and non-blank
    Required(&'static str),
    /// Field is an integer
    Integer(&'static str),
    /// Field is a parseable timestamp
    Date(&'static str),
}

/// Why a record produced no row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("{field} is not a valid GUID: '{value}'")]
    InvalidUuid { field: &'static str, value: String },

    #[error("required field {0} is missing or empty")]
    MissingField(&'static str),

    #[error("{field} is not an integer: '{value}'")]
    NotInteger { field: &'static str, value: String },

    #[error("{field} is not a valid date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
}

impl Rule {
    pub fn check(&self, record: &Record) -> Result<(), SkipReason> {
        match *self {
            Rule::Uuid(field) => {
                let value = text_of(record, field);
                if is_uuid(&value) {
                    Ok(())
                } else {
                    Err(SkipReason::InvalidUuid { field, value })
                }
            },
            Rule::Required(field) => {
                if text_of(record, field).trim().is_empty() {
                    Err(SkipReason::MissingField(field))
                } else {
                    Ok(())
                }
            },
            Rule::Integer(field) => {
                let value = text_of(record, field);
                match parse_integer(&value) {
                    Some(_) => Ok(()),
                    None => Err(SkipReason::NotInteger { field, value }),
                }
            },
            Rule::Date(field) => {
                let value = text_of(record, field);
                if value.trim().is_empty() {
                    return Err(SkipReason::MissingField(field));
                }
                match parse_datetime(&value) {
                    Some(_) => Ok(()),
                    None => Err(SkipReason::InvalidDate { field, value }),
                }
            },
        }
    }
}

/// Whether one record yields a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordVerdict {
    Keep,
    Skip(SkipReason),
}

/// One CSV table
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub rules: &'static [Rule],
}

/// Built row plus the number of date and GUID cells that had to be blanked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    pub date_warnings: u64,
    pub id_warnings: u64,
}

impl TableSpec {
    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Apply the rules in declaration order, stopping at the first failure
    pub fn verdict(&self, record: &Record) -> RecordVerdict {
        for rule in self.rules {
            if let Err(reason) = rule.check(record) {
                return RecordVerdict::Skip(reason);
            }
        }
        RecordVerdict::Keep
    }

    /// Render `record` as one row. `parent` supplies foreign keys for child
    /// tables, `row_id` the value of a [`ColumnSource::RowId`] column.
    pub fn build_row(&self, record: &Record, parent: Option<&Record>, row_id: u64) -> Row {
        let mut date_warnings = 0;
        let mut id_warnings = 0;
        let cells = self
            .columns
            .iter()
            .map(|column| match column.source {
                ColumnSource::Field(key) => text_of(record, key),
                ColumnSource::Date(key) => {
                    let raw = text_of(record, key);
                    if raw.trim().is_empty() {
                        return String::new();
                    }
                    normalize_datetime(&raw).unwrap_or_else(|| {
                        warn!(table = self.name, column = column.name, value = %raw, "Unparseable date, leaving it empty");
                        date_warnings += 1;
                        String::new()
                    })
                },
                ColumnSource::Bool(key) => is_truthy(&text_of(record, key)).to_string(),
                ColumnSource::Int(key) => parse_integer(&text_of(record, key))
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                ColumnSource::OptionalUuid(key) => {
                    let raw = text_of(record, key);
                    if is_uuid(&raw) {
                        raw.trim().to_string()
                    } else {
                        if !raw.trim().is_empty() {
                            warn!(table = self.name, column = column.name, value = %raw, "Malformed GUID, leaving it empty");
                            id_warnings += 1;
                        }
                        String::new()
                    }
                },
                ColumnSource::GeneratedUuid => uuid::Uuid::new_v4().to_string(),
                ColumnSource::RowId => row_id.to_string(),
                ColumnSource::Empty => String::new(),
                ColumnSource::Parent(key) => parent.map(|p| text_of(p, key)).unwrap_or_default(),
            })
            .collect();

        Row {
            cells,
            date_warnings,
            id_warnings,
        }
    }
}

/// A child table expanded from the nested list (or object) under `key`
#[derive(Debug, Clone, Copy)]
pub struct ChildTable {
    pub key: &'static str,
    pub table: TableSpec,
}

/// Cleaning unit: one crawl source into one primary table plus children
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    /// Output directory name under the cleaned root
    pub name: &'static str,
    /// Crawl source whose batches are read
    pub source: &'static str,
    pub table: TableSpec,
    pub children: &'static [ChildTable],
}

impl Domain {
    /// `{source}_batch`, the prefix of the input files
    pub fn input_prefix(&self) -> String {
        format!("{}_batch", self.source)
    }

    /// Every table of the domain, primary first
    pub fn tables(&self) -> impl Iterator<Item = &TableSpec> + '_ {
        std::iter::once(&self.table).chain(self.children.iter().map(|c| &c.table))
    }
}

fn text_of(record: &Record, key: &str) -> String {
    record.text(key).unwrap_or_default()
}
