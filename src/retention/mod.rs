//! Index retention core
//!
//! Decides which date-partitioned indices are past their retention window
//! and archives and/or deletes them one at a time.
//!
//! # Module Organization
//!
//! - [`classifier`] - Date-token parsing and staleness selection
//! - [`waiter`] - Bounded snapshot status polling
//! - [`orchestrator`] - Batch driver with the disk admission gate
//! - [`outcome`] - Per-index results and batch summaries

pub mod classifier;
pub mod orchestrator;
pub mod outcome;
pub mod waiter;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export main types for convenience
pub use classifier::{classify, IndexRecord};
pub use orchestrator::{
	snapshot_name, BackupSettings, RetentionMode, RetentionOrchestrator, RunRequest,
};
pub use outcome::{AbortReason, BatchOutcome, IndexOutcome, IndexResult};
pub use waiter::{Sleeper, SnapshotWaiter, TokioSleeper, WaitOutcome, WaiterConfig};
