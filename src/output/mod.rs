//! Output module for run summaries and search listings
//!
//! This module handles:
//! - Collecting per-item outcomes into a report ordered by destination
//! - Printing the run summary (counts, failures, skipped series, elapsed time)
//! - Formatting search results

mod listing;
mod report;

pub use listing::format_search_results;
pub use report::{print_report, ReportEntry, SyncReport};
