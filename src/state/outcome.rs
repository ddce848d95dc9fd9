/// Outcome definitions for dispatched work items
///
/// Every work item ends in exactly one outcome; errors never escape a work
/// item, they become a `Failed` outcome carrying a reason tag.
use crate::SyncError;
use std::fmt;

/// The result of one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The item was fetched and written
    Success,

    /// Nothing was done
    Skipped(SkipReason),

    /// The item failed; the rest of the batch carried on
    Failed(FailureReason),
}

impl Outcome {
    /// Converts a worker result into an outcome
    pub fn from_result<T>(result: &Result<T, SyncError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(SyncError::SentinelMissing { .. }) => Self::Skipped(SkipReason::SentinelMissing),
            Err(e) => Self::Failed(FailureReason::from(e)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Why an item was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The destination file is already present
    AlreadyExists,

    /// The series folder has no origin sentinel
    SentinelMissing,

    /// Another series in the same run sanitizes to the same folder
    FolderCollision,

    /// Another issue in the same run already claims the destination
    DuplicateDestination,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already-exists"),
            Self::SentinelMissing => write!(f, "sentinel-missing"),
            Self::FolderCollision => write!(f, "folder-collision"),
            Self::DuplicateDestination => write!(f, "duplicate-destination"),
        }
    }
}

/// A failure tag plus the error message it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&SyncError> for FailureReason {
    fn from(error: &SyncError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Short reason tag for failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network, transport or non-2xx response
    Fetch,

    /// A page image could not be decoded
    Decode,

    /// An issue yielded zero usable pages
    NoContent,

    /// The series folder has no origin sentinel
    SentinelMissing,

    /// Local filesystem failure
    Storage,

    /// The output document could not be produced
    Document,

    /// The worker itself failed (panic, pool shut down)
    Worker,

    Config,

    Selection,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Decode => "decode",
            Self::NoContent => "no-content",
            Self::SentinelMissing => "sentinel-missing",
            Self::Storage => "storage",
            Self::Document => "document",
            Self::Worker => "worker",
            Self::Config => "config",
            Self::Selection => "selection",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
