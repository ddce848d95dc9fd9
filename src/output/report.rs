//! Run reports
//!
//! A report collects one entry per work item that ended in a notable way:
//! every issue (downloaded, already present, skipped or failed) and every series that
//! was skipped or could not be listed.

use crate::model::WorkItem;
use crate::state::{FailureReason, Outcome, SkipReason};
use chrono::{DateTime, Duration, Utc};

/// One work item and how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub item: WorkItem,
    pub outcome: Outcome,
}

/// Outcomes of one sync invocation
#[derive(Debug, Clone)]
pub struct SyncReport {
    entries: Vec<ReportEntry>,
    pages_written: usize,
    pages_dropped: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    /// Starts an empty report timed from now
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            pages_written: 0,
            pages_dropped: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, item: WorkItem, outcome: Outcome) {
        self.entries.push(ReportEntry { item, outcome });
    }

    /// Adds the page counts of one written issue
    pub fn add_pages(&mut self, written: usize, dropped: usize) {
        self.pages_written += written;
        self.pages_dropped += dropped;
    }

    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    /// Pages left out of written issues because they could not be fetched or decoded
    pub fn pages_dropped(&self) -> usize {
        self.pages_dropped
    }

    /// Stops the clock and orders entries by destination path
    ///
    /// The sort is stable, so the order does not depend on which worker
    /// finished first.
    pub fn finish(&mut self) {
        self.entries
            .sort_by(|a, b| a.item.destination().cmp(b.item.destination()));
        self.finished_at = Some(Utc::now());
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Issues written during this run
    pub fn downloaded(&self) -> usize {
        self.count_issues(Outcome::is_success)
    }

    /// Issues skipped because their file was already present
    pub fn already_present(&self) -> usize {
        self.count_issues(|o| matches!(o, Outcome::Skipped(SkipReason::AlreadyExists)))
    }

    /// Issues that failed
    pub fn failed(&self) -> usize {
        self.count_issues(Outcome::is_failed)
    }

    /// Failed issues with their failure reasons
    pub fn failures(&self) -> impl Iterator<Item = (&WorkItem, &FailureReason)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Failed(reason) if e.item.is_issue() => Some((&e.item, reason)),
            _ => None,
        })
    }

    /// Issues left out for reasons other than an existing file
    pub fn skipped_issues(&self) -> impl Iterator<Item = (&WorkItem, SkipReason)> {
        self.entries.iter().filter_map(|e| match e.outcome {
            Outcome::Skipped(SkipReason::AlreadyExists) => None,
            Outcome::Skipped(reason) if e.item.is_issue() => Some((&e.item, reason)),
            _ => None,
        })
    }

    /// Series entries: series that were skipped or could not be listed
    pub fn series_notes(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.item.is_issue())
    }

    /// True when no issue and no series failed
    pub fn is_clean(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failed())
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    fn count_issues(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|e| e.item.is_issue() && predicate(&e.outcome))
            .count()
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints a report to stdout
pub fn print_report(report: &SyncReport) {
    println!("=== Sync Summary ===\n");

    println!("  Downloaded: {}", report.downloaded());
    println!("  Already present: {}", report.already_present());
    println!("  Failed: {}", report.failed());
    if report.pages_dropped() > 0 {
        println!(
            "  Pages dropped: {} ({} written)",
            report.pages_dropped(),
            report.pages_written()
        );
    }
    println!();

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("Failed Issues ({}):", failures.len());
        for (item, reason) in failures {
            println!("  - {} [{}] {}", item.destination().display(), reason.kind, reason.message);
        }
        println!();
    }

    let skipped: Vec<_> = report.skipped_issues().collect();
    if !skipped.is_empty() {
        println!("Skipped Issues ({}):", skipped.len());
        for (item, reason) in skipped {
            println!("  - {} [{}]", item.destination().display(), reason);
        }
        println!();
    }

    let notes: Vec<_> = report.series_notes().collect();
    if !notes.is_empty() {
        println!("Series Not Synced ({}):", notes.len());
        for note in notes {
            println!("  - {}: {}", note.item.destination().display(), note.outcome);
        }
        println!();
    }

    let elapsed = report.elapsed();
    println!(
        "Finished in {}.{:03}s",
        elapsed.num_seconds(),
        elapsed.num_milliseconds().rem_euclid(1000)
    );
}
