//! Pipeline module for catalog sync
//!
//! This module contains the sync pipeline:
//! - Dedup planning against the library
//! - Bounded concurrent dispatch with per-item failure isolation
//! - Issue assembly from page images
//! - The top-level operations (search, series download, single issue, update)

mod assemble;
mod coordinator;
mod dispatch;
mod plan;

pub use assemble::{AssembledIssue, Assembler};
pub use coordinator::Syncer;
pub use dispatch::{Dispatcher, LogProgress, Progress, ProgressSink, WorkerPool};
pub use plan::{dispatch_order, issue_entries, plan, unique_destinations, Plan};
