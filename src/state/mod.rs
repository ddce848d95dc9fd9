//! State module for tracking sync progress
//!
//! # Components
//!
//! - `Outcome`: How a single work item ended (success, skipped, failed with a reason tag)
//! - `SyncPhase`: How far one sync invocation has progressed
//! - `PhaseTracker`: Enforces the phase order within an invocation

mod outcome;
mod phase;

// Re-export main types
pub use outcome::{FailureKind, FailureReason, Outcome, SkipReason};
pub use phase::{PhaseTracker, SyncPhase};
