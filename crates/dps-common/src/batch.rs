//! Threshold-flushing JSON batch buffer
//!
//! Records are appended in producer order. As soon as the pending count
//! reaches the threshold the buffer writes them as one pretty-printed JSON
//! array to `{prefix}_{counter}.json` and starts over. `finalize` writes the
//! remainder once the producer is done.
//!
//! The buffer is shared by concurrently running request sequences, so append
//! and the threshold check happen under one lock together with the write.
//! Two sequences can therefore never flush the same pending list or claim
//! the same counter value.

use crate::error::{DpsError, Result};
use crate::record::Record;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

/// Default number of records per batch file
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// What a buffer wrote over its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: Vec<PathBuf>,
    pub records_written: u64,
    pub records_dropped: u64,
}

struct BatchState<T> {
    pending: Vec<T>,
    /// Number used for the next file, starts at 1
    counter: u64,
    finalized: bool,
    summary: BatchSummary,
}

/// Coalesces items into fixed-size JSON array files
pub struct BatchBuffer<T = Record> {
    dir: PathBuf,
    prefix: String,
    threshold: usize,
    state: Mutex<BatchState<T>>,
}

impl<T: Serialize> BatchBuffer<T> {
    /// Create a buffer writing `{prefix}_{n}.json` files into `dir`.
    ///
    /// The directory is created if missing.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, threshold: usize) -> Result<Self> {
        if threshold == 0 {
            return Err(DpsError::config("batch threshold must be greater than 0"));
        }
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            prefix: prefix.into(),
            threshold,
            state: Mutex::new(BatchState {
                pending: Vec::with_capacity(threshold.min(DEFAULT_BATCH_SIZE)),
                counter: 1,
                finalized: false,
                summary: BatchSummary::default(),
            }),
        })
    }

    /// Number of items waiting for the next flush
    pub fn pending_len(&self) -> Result<usize> {
        Ok(self.lock()?.pending.len())
    }

    /// Append one item, flushing immediately when the threshold is reached.
    ///
    /// Returns the path of the file written by this call, if any.
    pub fn append(&self, item: T) -> Result<Option<PathBuf>> {
        let mut state = self.lock()?;
        if state.finalized {
            return Err(DpsError::Finalized(self.prefix.clone()));
        }
        state.pending.push(item);
        if state.pending.len() >= self.threshold {
            return self.write_pending(&mut state);
        }
        Ok(None)
    }

    /// Write pending items to a new file. No-op on an empty buffer.
    pub fn flush(&self) -> Result<Option<PathBuf>> {
        let mut state = self.lock()?;
        self.write_pending(&mut state)
    }

    /// Write the remainder and close the buffer.
    ///
    /// Later calls return the same summary without writing anything.
    pub fn finalize(&self) -> Result<BatchSummary> {
        let mut state = self.lock()?;
        if state.finalized {
            debug!(prefix = %self.prefix, "Batch buffer already finalized");
            return Ok(state.summary.clone());
        }
        let flushed = self.write_pending(&mut state);
        state.finalized = true;
        flushed?;

        info!(
            prefix = %self.prefix,
            files = state.summary.files.len(),
            records = state.summary.records_written,
            "Batch buffer finalized"
        );
        Ok(state.summary.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BatchState<T>>> {
        self.state.lock().map_err(|_| DpsError::Poisoned)
    }

    fn file_path(&self, counter: u64) -> PathBuf {
        self.dir.join(format!("{}_{}.json", self.prefix, counter))
    }

    fn write_pending(&self, state: &mut BatchState<T>) -> Result<Option<PathBuf>> {
        if state.pending.is_empty() {
            return Ok(None);
        }

        let items = std::mem::take(&mut state.pending);
        let count = items.len() as u64;
        let path = self.file_path(state.counter);
        // The number is spent even if the write fails
        state.counter += 1;

        let outcome = serde_json::to_vec_pretty(&items)
            .map_err(DpsError::from)
            .and_then(|bytes| {
                std::fs::write(&path, bytes).map_err(|source| DpsError::Write {
                    path: path.clone(),
                    source,
                })
            });

        match outcome {
            Ok(()) => {
                info!(file = %path.display(), records = count, "Saved batch file");
                state.summary.records_written += count;
                state.summary.files.push(path.clone());
                Ok(Some(path))
            },
            Err(e) => {
                error!(file = %path.display(), records = count, error = %e, "Failed to save batch file");
                state.summary.records_dropped += count;
                Err(e)
            },
        }
    }
}
