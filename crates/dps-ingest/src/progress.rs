//! Progress bar for crawl runs

use indicatif::{ProgressBar, ProgressStyle};

const SEED_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} seeds ({eta})";

/// Bar counting finished seed sequences
pub fn create_seed_progress(total: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(SEED_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
