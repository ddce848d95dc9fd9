/// Phase definitions for one sync invocation
///
/// A sync, series download or update pass always walks the same phases:
/// `Start -> ListingFetched -> Planned -> Dispatched -> Reported`.
/// No phase survives the invocation; re-running from `Start` is always safe.
use crate::SyncError;
use std::fmt;

/// Represents how far a sync invocation has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    /// Nothing has been fetched yet
    Start,

    /// The listing pages have been resolved into candidate issues
    ListingFetched,

    /// Candidates have been filtered against the library
    Planned,

    /// Missing issues have been run through the worker pool
    Dispatched,

    /// Outcomes have been collected into a report
    Reported,
}

impl SyncPhase {
    /// The phase that follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::ListingFetched),
            Self::ListingFetched => Some(Self::Planned),
            Self::Planned => Some(Self::Dispatched),
            Self::Dispatched => Some(Self::Reported),
            Self::Reported => None,
        }
    }

    /// Returns true if moving from this phase to `to` is allowed
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ListingFetched => "listing_fetched",
            Self::Planned => "planned",
            Self::Dispatched => "dispatched",
            Self::Reported => "reported",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the phase of one invocation and rejects out-of-order moves
#[derive(Debug)]
pub struct PhaseTracker {
    operation: &'static str,
    phase: SyncPhase,
}

impl PhaseTracker {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            phase: SyncPhase::Start,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Moves to `to`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition was valid
    /// * `Err(SyncError::InvalidTransition)` - `to` does not follow the current phase
    pub fn advance(&mut self, to: SyncPhase) -> Result<(), SyncError> {
        if !self.phase.can_transition_to(to) {
            return Err(SyncError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        tracing::debug!("{}: {} -> {}", self.operation, self.phase, to);
        self.phase = to;
        Ok(())
    }
}
