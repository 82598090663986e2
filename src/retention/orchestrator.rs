//! Retention batch driver
//!
//! Runs one retention pass: list and classify indices, then, strictly one
//! index at a time, either snapshot-wait-delete or delete outright. Only a
//! failed listing or an unreadable pre-batch disk sample escapes as an error;
//! everything that goes wrong with a single index is recorded in the
//! [`BatchOutcome`] and the batch moves on.

use super::classifier::{classify, IndexRecord};
use super::outcome::{AbortReason, BatchOutcome, IndexOutcome};
use super::waiter::{Sleeper, SnapshotWaiter, WaitOutcome, WaiterConfig};
use crate::cluster::{ClusterClient, ClusterError, SnapshotRequest};
use crate::config::SnapshotConfig;
use crate::disk::DiskMonitor;
use crate::error::{Result, RetentionError};
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Timestamp format embedded in snapshot names
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Snapshot name for an index, stable for the whole batch
pub fn snapshot_name(index: &str, started_at: NaiveDateTime) -> String {
	format!("snapshot-{}-{}", index, started_at.format(SNAPSHOT_TIMESTAMP_FORMAT))
}

/// Parameters for archiving before deletion
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSettings {
	pub repository: String,
	pub disk_threshold_percent: f64,
	pub disk_path: PathBuf,
	pub poll_interval: Duration,
	pub max_retries: u32,
}

impl BackupSettings {
	fn waiter_config(&self) -> WaiterConfig {
		WaiterConfig {
			poll_interval: self.poll_interval,
			max_retries: self.max_retries,
		}
	}
}

impl From<&SnapshotConfig> for BackupSettings {
	fn from(config: &SnapshotConfig) -> Self {
		Self {
			repository: config.repository_name.clone(),
			disk_threshold_percent: config.disk_usage_threshold,
			disk_path: config.disk_path.clone(),
			poll_interval: config.retry_interval(),
			max_retries: config.max_retries,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetentionMode {
	/// Snapshot each stale index, wait for it, then delete the index
	BackupAndDelete(BackupSettings),
	/// Delete stale indices without archiving
	DeleteOnly,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
	pub mode: RetentionMode,
	/// Indices strictly older than this many days are stale
	pub threshold_days: i64,
	/// Captured once per batch; drives classification and snapshot names
	pub started_at: NaiveDateTime,
	/// Log the plan without touching the cluster
	pub dry_run: bool,
}

enum Step {
	Continue,
	Abort(AbortReason),
}

pub struct RetentionOrchestrator {
	cluster: Arc<dyn ClusterClient>,
	disk: Arc<dyn DiskMonitor>,
	sleeper: Arc<dyn Sleeper>,
}

impl RetentionOrchestrator {
	pub fn new(
		cluster: Arc<dyn ClusterClient>, disk: Arc<dyn DiskMonitor>, sleeper: Arc<dyn Sleeper>,
	) -> Self {
		Self { cluster, disk, sleeper }
	}

	/// Run one retention batch
	pub async fn run(&self, request: &RunRequest) -> Result<BatchOutcome> {
		let names = self.cluster.list_indices().await?;
		debug!("Cluster reported {} indices", names.len());

		let stale = classify(&names, request.started_at, request.threshold_days);
		info!("List of indices older than {} days:", request.threshold_days);
		for record in &stale {
			info!("Index: {}", record.name);
		}

		let mut batch = BatchOutcome::new(stale.clone());
		batch.dry_run = request.dry_run;

		if request.dry_run {
			self.log_plan(&stale, request);
			return Ok(batch);
		}

		match &request.mode {
			RetentionMode::BackupAndDelete(settings) => {
				self.backup_and_delete(&stale, settings, request.started_at, &mut batch)
					.await?
			}
			RetentionMode::DeleteOnly => self.delete_only(&stale, &mut batch).await,
		}

		Ok(batch)
	}

	async fn backup_and_delete(
		&self, stale: &[IndexRecord], settings: &BackupSettings, started_at: NaiveDateTime,
		batch: &mut BatchOutcome,
	) -> Result<()> {
		let used = self.disk.used_percent(&settings.disk_path).map_err(|e| {
			RetentionError::disk_usage(&settings.disk_path.display().to_string(), &e.to_string())
		})?;

		if used > settings.disk_threshold_percent {
			let reason = AbortReason::DiskThreshold {
				used_percent: used,
				threshold_percent: settings.disk_threshold_percent,
				after_index: None,
			};
			warn!("Warning: {}. Exiting.", reason);
			batch.aborted = Some(reason);
			return Ok(());
		}

		for (position, record) in stale.iter().enumerate() {
			let outcome = self.archive_and_delete(record, settings, started_at).await;
			let deleted = outcome.index_deleted();
			batch.record(&record.name, outcome);

			if !deleted {
				continue;
			}

			if let Step::Abort(reason) = self.check_disk_after(&record.name, settings) {
				warn!("Warning: {}. Exiting.", reason);
				for skipped in &stale[position + 1..] {
					batch.record(&skipped.name, IndexOutcome::SkippedDueToDisk);
				}
				batch.aborted = Some(reason);
				break;
			}
		}

		Ok(())
	}

	async fn archive_and_delete(
		&self, record: &IndexRecord, settings: &BackupSettings, started_at: NaiveDateTime,
	) -> IndexOutcome {
		let snapshot = snapshot_name(&record.name, started_at);
		let request = SnapshotRequest::new(&settings.repository, &snapshot, &record.name);

		if let Err(e) = self.cluster.create_snapshot(&request).await {
			log_cluster_error("snapshot", &record.name, &e);
			return IndexOutcome::SnapshotFailed { snapshot, reason: e.to_string() };
		}
		info!("Snapshot created for index {}: {}", record.name, snapshot);

		let waiter =
			SnapshotWaiter::new(self.cluster.as_ref(), self.sleeper.as_ref(), settings.waiter_config());

		match waiter.await_completion(&settings.repository, &snapshot).await {
			WaitOutcome::Succeeded => {}
			WaitOutcome::Failed(reason) => {
				error!("Snapshot creation failed for index {}: {}", record.name, reason);
				return IndexOutcome::SnapshotFailed { snapshot, reason };
			}
			WaitOutcome::TimedOut { polls } => {
				warn!("Snapshot creation timed out for index {}", record.name);
				return IndexOutcome::SnapshotTimedOut { snapshot, polls };
			}
		}

		match self.cluster.delete_index(&record.name).await {
			Ok(()) => {
				info!("Index {} deleted after snapshot creation.", record.name);
				IndexOutcome::ArchivedAndDeleted { snapshot }
			}
			Err(e) => {
				log_cluster_error("delete", &record.name, &e);
				IndexOutcome::DeleteFailed { reason: e.to_string() }
			}
		}
	}

	fn check_disk_after(&self, index: &str, settings: &BackupSettings) -> Step {
		match self.disk.used_percent(&settings.disk_path) {
			Ok(used) if used > settings.disk_threshold_percent => {
				Step::Abort(AbortReason::DiskThreshold {
					used_percent: used,
					threshold_percent: settings.disk_threshold_percent,
					after_index: Some(index.to_string()),
				})
			}
			Ok(used) => {
				debug!("Disk usage {:.1}% after processing index {}", used, index);
				Step::Continue
			}
			Err(e) => Step::Abort(AbortReason::DiskUnreadable {
				cause: e.to_string(),
				after_index: index.to_string(),
			}),
		}
	}

	async fn delete_only(&self, stale: &[IndexRecord], batch: &mut BatchOutcome) {
		for record in stale {
			match self.cluster.delete_index(&record.name).await {
				Ok(()) => {
					info!("Index {} deleted.", record.name);
					batch.record(&record.name, IndexOutcome::Deleted);
				}
				Err(e) => {
					log_cluster_error("delete", &record.name, &e);
					batch.record(&record.name, IndexOutcome::DeleteFailed { reason: e.to_string() });
				}
			}
		}
	}

	fn log_plan(&self, stale: &[IndexRecord], request: &RunRequest) {
		for record in stale {
			match &request.mode {
				RetentionMode::BackupAndDelete(settings) => info!(
					"DRY RUN: would snapshot index {} to {}/{} and delete it",
					record.name,
					settings.repository,
					snapshot_name(&record.name, request.started_at)
				),
				RetentionMode::DeleteOnly => {
					info!("DRY RUN: would delete index {}", record.name)
				}
			}
		}
	}
}

/// Per-index cluster failures are recorded, never propagated; the kind only
/// decides how loudly they are reported.
fn log_cluster_error(action: &str, index: &str, err: &ClusterError) {
	let category = err.category();
	match err {
		ClusterError::Request { status, reason } => error!(
			category,
			"Request error while trying to {} index {}: {} {}", action, index, status, reason
		),
		ClusterError::Connection(cause) => error!(
			category,
			"Cluster unreachable while trying to {} index {}: {}", action, index, cause
		),
		ClusterError::Authorization { status, reason } => error!(
			category,
			"Credentials rejected while trying to {} index {}: {} {}", action, index, status, reason
		),
		ClusterError::Other(cause) => error!(
			category,
			"An error occurred while trying to {} index {}: {}", action, index, cause
		),
	}
}
