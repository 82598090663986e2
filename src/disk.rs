//! Filesystem capacity sampling for the disk admission gate

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiskError {
	#[error("Failed to stat filesystem at {path}: {cause}")]
	StatFailed { path: String, cause: String },

	#[error("Filesystem at {path} reports zero capacity")]
	ZeroCapacity { path: String },

	#[error("Disk usage sampling is not supported on this platform")]
	Unsupported,
}

/// A single capacity sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
	pub total_bytes: u64,
	pub used_bytes: u64,
}

impl DiskUsage {
	pub fn used_percent(&self) -> f64 {
		if self.total_bytes == 0 {
			return 0.0;
		}
		self.used_bytes as f64 / self.total_bytes as f64 * 100.0
	}
}

/// Reports used capacity for a filesystem path. Every call samples afresh.
pub trait DiskMonitor: Send + Sync {
	fn usage(&self, path: &Path) -> Result<DiskUsage, DiskError>;

	fn used_percent(&self, path: &Path) -> Result<f64, DiskError> {
		self.usage(path).map(|usage| usage.used_percent())
	}
}

/// [`DiskMonitor`] backed by `statvfs(3)`
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsDiskMonitor;

#[cfg(unix)]
impl DiskMonitor for StatvfsDiskMonitor {
	fn usage(&self, path: &Path) -> Result<DiskUsage, DiskError> {
		let stat = nix::sys::statvfs::statvfs(path).map_err(|e| DiskError::StatFailed {
			path: path.display().to_string(),
			cause: e.to_string(),
		})?;

		let fragment = stat.fragment_size() as u64;
		let total_bytes = stat.blocks() as u64 * fragment;
		let free_bytes = stat.blocks_free() as u64 * fragment;

		if total_bytes == 0 {
			return Err(DiskError::ZeroCapacity { path: path.display().to_string() });
		}

		Ok(DiskUsage {
			total_bytes,
			used_bytes: total_bytes.saturating_sub(free_bytes),
		})
	}
}

#[cfg(not(unix))]
impl DiskMonitor for StatvfsDiskMonitor {
	fn usage(&self, _path: &Path) -> Result<DiskUsage, DiskError> {
		Err(DiskError::Unsupported)
	}
}
