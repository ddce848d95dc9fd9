//! Catalog items and units of work
//!
//! - `SeriesEntry`: a series found on a catalog search page
//! - `IssueEntry`: an issue of a series with its local destination
//! - `WorkItem`: what the worker pool runs and what a report refers to

use crate::catalog::ListingEntry;
use std::fmt;
use std::path::{Path, PathBuf};

/// A series listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEntry {
    pub title: String,
    pub remote_url: String,
}

impl From<ListingEntry> for SeriesEntry {
    fn from(entry: ListingEntry) -> Self {
        Self {
            title: entry.title,
            remote_url: entry.href,
        }
    }
}

/// An issue and the file it is materialized to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEntry {
    pub title: String,
    pub remote_url: String,
    pub local_path: PathBuf,
}

/// A series as seen during an update pass: its local folder and, once the
/// sentinel has been read, its origin URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesTarget {
    pub series_dir: PathBuf,
    pub remote_url: Option<String>,
}

/// The unit dispatched to the worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Resolve a series listing into issues
    Series(SeriesTarget),

    /// Fetch and assemble one issue
    Issue(IssueEntry),
}

impl WorkItem {
    /// The local path this item writes to: the series folder or the issue file
    pub fn destination(&self) -> &Path {
        match self {
            Self::Series(target) => &target.series_dir,
            Self::Issue(issue) => &issue.local_path,
        }
    }

    pub fn is_issue(&self) -> bool {
        matches!(self, Self::Issue(_))
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series(target) => write!(f, "series {}", target.series_dir.display()),
            Self::Issue(issue) => write!(f, "issue {}", issue.local_path.display()),
        }
    }
}
