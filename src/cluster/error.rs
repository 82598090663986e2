//! Cluster error kinds

use thiserror::Error;

/// Failures reported by a [`super::ClusterClient`]
///
/// The set is closed: callers match on the variant instead of inspecting
/// transport-specific error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Authorization rejected ({status}): {reason}")]
	Authorization { status: u16, reason: String },

	#[error("Request rejected ({status}): {reason}")]
	Request { status: u16, reason: String },

	#[error("Unexpected cluster response: {0}")]
	Other(String),
}

impl ClusterError {
	/// Classify a non-success HTTP status
	pub fn from_status(status: u16, reason: impl Into<String>) -> Self {
		let reason = reason.into();
		match status {
			401 | 403 => ClusterError::Authorization { status, reason },
			_ => ClusterError::Request { status, reason },
		}
	}

	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			ClusterError::Connection(_) => "connection",
			ClusterError::Authorization { .. } => "authorization",
			ClusterError::Request { .. } => "request",
			ClusterError::Other(_) => "other",
		}
	}
}

impl From<reqwest::Error> for ClusterError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_connect() || err.is_timeout() {
			ClusterError::Connection(err.to_string())
		} else if let Some(status) = err.status() {
			ClusterError::from_status(status.as_u16(), err.to_string())
		} else if err.is_decode() {
			ClusterError::Other(err.to_string())
		} else {
			ClusterError::Connection(err.to_string())
		}
	}
}

pub type ClusterResult<T> = Result<T, ClusterError>;
