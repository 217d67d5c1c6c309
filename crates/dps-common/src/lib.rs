//! DPS Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the pest reference crawler and cleaner.
//!
//! # Overview
//!
//! - **Error Handling**: [`DpsError`] and the crate [`Result`] alias
//! - **Logging**: tracing subscriber setup shared by both binaries
//! - **Records**: the [`Record`] type and the declarative field mapper
//! - **Batches**: the threshold-flushing JSON [`batch::BatchBuffer`] and
//!   helpers for discovering numbered batch files on disk
//!
//! # Example
//!
//! ```no_run
//! use dps_common::batch::BatchBuffer;
//! use dps_common::record::{map_record, RecordSpec, FieldSpec};
//!
//! static FIELDS: &[FieldSpec] = &[FieldSpec::keep("TP_GUID")];
//! static SPEC: RecordSpec = RecordSpec::flat(FIELDS);
//!
//! fn main() -> dps_common::Result<()> {
//!     let buffer = BatchBuffer::new("./data/pests", "pests_batch", 5000)?;
//!     let raw = serde_json::json!({"TP_GUID": "8c3f..."});
//!     buffer.append(map_record(&raw, &SPEC))?;
//!     buffer.finalize()?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod files;
pub mod logging;
pub mod record;

// Re-export commonly used types
pub use error::{DpsError, Result};
pub use record::Record;
