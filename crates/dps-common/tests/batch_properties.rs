//! Batch count properties of the JSON batch buffer
//!
//! For N appended records and threshold T the buffer must produce
//! ceil(N / T) files: floor(N / T) full ones and a final one holding the
//! remainder.

use dps_common::batch::BatchBuffer;
use dps_common::files::numbered_files;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn batch_sizes(dir: &std::path::Path, prefix: &str) -> Vec<usize> {
    numbered_files(dir, prefix, "json")
        .expect("list batch files")
        .iter()
        .map(|f| {
            let items: Vec<Value> =
                serde_json::from_slice(&std::fs::read(&f.path).expect("read batch")).expect("parse batch");
            items.len()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn batch_file_counts_match_threshold(n in 0usize..120, t in 1usize..17) {
        let dir = TempDir::new().expect("tempdir");
        let buffer = BatchBuffer::new(dir.path(), "prop_batch", t).expect("buffer");
        for i in 0..n {
            buffer.append(json!({"i": i})).expect("append");
        }
        let summary = buffer.finalize().expect("finalize");

        let sizes = batch_sizes(dir.path(), "prop_batch");
        prop_assert_eq!(sizes.len(), n.div_ceil(t));
        prop_assert_eq!(summary.files.len(), sizes.len());
        prop_assert_eq!(summary.records_written as usize, n);

        let full = n / t;
        for size in &sizes[..full] {
            prop_assert_eq!(*size, t);
        }
        if n % t != 0 {
            prop_assert_eq!(sizes[full], n % t);
        }
    }
}

#[test]
fn records_keep_producer_order_across_files() {
    let dir = TempDir::new().expect("tempdir");
    let buffer = BatchBuffer::new(dir.path(), "order_batch", 3).expect("buffer");
    for i in 0..8 {
        buffer.append(json!(i)).expect("append");
    }
    buffer.finalize().expect("finalize");

    let mut seen = Vec::new();
    for file in numbered_files(dir.path(), "order_batch", "json").expect("list") {
        let items: Vec<i64> = serde_json::from_slice(&std::fs::read(&file.path).expect("read")).expect("parse");
        seen.extend(items);
    }
    assert_eq!(seen, (0..8).collect::<Vec<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_never_share_a_file() {
    let dir = TempDir::new().expect("tempdir");
    let buffer = Arc::new(BatchBuffer::new(dir.path(), "race_batch", 7).expect("buffer"));

    let mut handles = Vec::new();
    for task in 0..8 {
        let buffer = Arc::clone(&buffer);
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                buffer.append(json!({"task": task, "i": i})).expect("append");
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }
    let summary = buffer.finalize().expect("finalize");

    let sizes = batch_sizes(dir.path(), "race_batch");
    assert_eq!(sizes.iter().sum::<usize>(), 200);
    assert_eq!(sizes.len(), 200usize.div_ceil(7));
    assert!(sizes[..sizes.len() - 1].iter().all(|&s| s == 7));
    assert_eq!(summary.records_written, 200);
}
