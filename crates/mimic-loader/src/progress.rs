//! Progress reporting for event table scans.
//!
//! Bars are sized by the approximate row count of the full MIMIC-III table
//! and advanced by rows read. They only observe the scan.

use indicatif::{ProgressBar, ProgressStyle};
use mimic_types::EventTable;

/// Template for event table scans.
pub const SCAN_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Creates the progress bar for scanning `table`.
///
/// Returns a hidden bar when `visible` is false.
pub fn scan_progress_bar(table: EventTable, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(table.expected_rows());
    if let Ok(style) = ProgressStyle::default_bar().template(SCAN_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Processing {table} table"));
    pb
}
