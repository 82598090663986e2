//! Per-index results and batch summaries

use super::classifier::IndexRecord;
use std::fmt;
use tracing::{info, warn};

/// What happened to a single stale index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
	/// Snapshot succeeded and the source index was deleted
	ArchivedAndDeleted { snapshot: String },
	/// Deleted without archival (delete-only mode)
	Deleted,
	/// Snapshot request rejected, or the snapshot ended failed/partial
	SnapshotFailed { snapshot: String, reason: String },
	/// Snapshot never reached a terminal state; the index was kept
	SnapshotTimedOut { snapshot: String, polls: u32 },
	/// Deletion of the index was rejected
	DeleteFailed { reason: String },
	/// Not attempted because the disk guard stopped the batch
	SkippedDueToDisk,
}

impl IndexOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, IndexOutcome::ArchivedAndDeleted { .. } | IndexOutcome::Deleted)
	}

	pub fn is_failure(&self) -> bool {
		matches!(
			self,
			IndexOutcome::SnapshotFailed { .. }
				| IndexOutcome::SnapshotTimedOut { .. }
				| IndexOutcome::DeleteFailed { .. }
		)
	}

	/// Whether the source index is gone after this outcome
	pub fn index_deleted(&self) -> bool {
		self.is_success()
	}

	pub fn label(&self) -> &'static str {
		match self {
			IndexOutcome::ArchivedAndDeleted { .. } => "archived-and-deleted",
			IndexOutcome::Deleted => "deleted",
			IndexOutcome::SnapshotFailed { .. } => "snapshot-failed",
			IndexOutcome::SnapshotTimedOut { .. } => "snapshot-timed-out",
			IndexOutcome::DeleteFailed { .. } => "delete-failed",
			IndexOutcome::SkippedDueToDisk => "skipped-due-to-disk",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexResult {
	pub index: String,
	pub outcome: IndexOutcome,
}

/// Why a batch stopped before reaching the end of the stale list
#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
	/// Used capacity crossed the threshold. `after_index` is `None` when the
	/// gate fired before any index was touched.
	DiskThreshold {
		used_percent: f64,
		threshold_percent: f64,
		after_index: Option<String>,
	},
	/// Capacity could not be sampled after processing an index
	DiskUnreadable { cause: String, after_index: String },
}

impl fmt::Display for AbortReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AbortReason::DiskThreshold {
				used_percent,
				threshold_percent,
				after_index: None,
			} => write!(
				f,
				"disk usage {used_percent:.1}% exceeded {threshold_percent:.1}% before starting the snapshot process"
			),
			AbortReason::DiskThreshold {
				used_percent,
				threshold_percent,
				after_index: Some(index),
			} => write!(
				f,
				"disk usage {used_percent:.1}% exceeded {threshold_percent:.1}% after processing index {index}"
			),
			AbortReason::DiskUnreadable { cause, after_index } => {
				write!(f, "disk usage unreadable after processing index {after_index}: {cause}")
			}
		}
	}
}

/// Everything a single run decided, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
	/// Stale indices found by classification, oldest first
	pub stale: Vec<IndexRecord>,
	/// One entry per index the batch reached
	pub results: Vec<IndexResult>,
	/// Set when a disk guard stopped the batch
	pub aborted: Option<AbortReason>,
	pub dry_run: bool,
}

impl BatchOutcome {
	pub fn new(stale: Vec<IndexRecord>) -> Self {
		Self { stale, ..Default::default() }
	}

	pub fn record(&mut self, index: &str, outcome: IndexOutcome) {
		self.results.push(IndexResult { index: index.to_string(), outcome });
	}

	pub fn outcome_for(&self, index: &str) -> Option<&IndexOutcome> {
		self.results
			.iter()
			.find(|result| result.index == index)
			.map(|result| &result.outcome)
	}

	pub fn succeeded(&self) -> usize {
		self.results.iter().filter(|r| r.outcome.is_success()).count()
	}

	pub fn failed(&self) -> usize {
		self.results.iter().filter(|r| r.outcome.is_failure()).count()
	}

	pub fn skipped(&self) -> usize {
		self.results
			.iter()
			.filter(|r| r.outcome == IndexOutcome::SkippedDueToDisk)
			.count()
	}

	/// The admission gate refused to start the batch
	pub fn aborted_before_start(&self) -> bool {
		matches!(
			self.aborted,
			Some(AbortReason::DiskThreshold { after_index: None, .. })
		)
	}

	pub fn log_summary(&self) {
		if let Some(reason) = &self.aborted {
			warn!("Batch stopped early: {}", reason);
		}

		info!(
			stale = self.stale.len(),
			succeeded = self.succeeded(),
			failed = self.failed(),
			skipped = self.skipped(),
			dry_run = self.dry_run,
			"Retention run complete"
		);

		for result in self.results.iter().filter(|r| r.outcome.is_failure()) {
			warn!("  {} -> {}", result.index, result.outcome.label());
		}
	}
}
