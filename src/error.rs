use thiserror::Error;

/// Batch-level error types
///
/// Only conditions that abort a whole run live here. Per-index failures are
/// absorbed by the orchestrator and reported through
/// `crate::retention::IndexOutcome` instead. Module-specific errors are
/// defined in their respective modules:
/// - Cluster errors: `crate::cluster::ClusterError`
/// - Configuration errors: `crate::config::ConfigError`
#[derive(Error, Debug)]
pub enum RetentionError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Cluster error: {0}")]
	Cluster(#[from] crate::cluster::ClusterError),

	#[error("Configuration error: {0}")]
	Configuration(#[from] crate::config::ConfigError),

	#[error("Disk usage unavailable for {path}: {cause}")]
	DiskUsage { path: String, cause: String },

	#[error(
		"Disk usage {used_percent:.1}% exceeded threshold {threshold_percent:.1}% before the batch started"
	)]
	DiskThresholdExceeded {
		used_percent: f64,
		threshold_percent: f64,
	},
}

impl RetentionError {
	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			RetentionError::Io(_) => "io",
			RetentionError::Cluster(cluster_err) => cluster_err.category(),
			RetentionError::Configuration(_) => "configuration",
			RetentionError::DiskUsage { .. } => "disk",
			RetentionError::DiskThresholdExceeded { .. } => "disk_threshold",
		}
	}

	/// Create a disk usage error for a path
	pub fn disk_usage(path: &str, cause: &str) -> Self {
		RetentionError::DiskUsage {
			path: path.to_string(),
			cause: cause.to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, RetentionError>;
