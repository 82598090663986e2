use serde::{Deserialize, Serialize};
use std::fmt;

/// State reported by the snapshot status API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SnapshotState {
	Success,
	Failed,
	Partial,
	Aborted,
	InProgress,
	Started,
	Init,
	Other(String),
}

impl From<String> for SnapshotState {
	fn from(raw: String) -> Self {
		match raw.to_ascii_uppercase().as_str() {
			"SUCCESS" => SnapshotState::Success,
			"FAILED" => SnapshotState::Failed,
			"PARTIAL" => SnapshotState::Partial,
			"ABORTED" => SnapshotState::Aborted,
			"IN_PROGRESS" => SnapshotState::InProgress,
			"STARTED" => SnapshotState::Started,
			"INIT" => SnapshotState::Init,
			_ => SnapshotState::Other(raw),
		}
	}
}

impl SnapshotState {
	/// Terminal success marker
	pub fn is_success(&self) -> bool {
		matches!(self, SnapshotState::Success)
	}

	/// Terminal failure markers; a partial snapshot counts as failed
	pub fn is_failure(&self) -> bool {
		matches!(
			self,
			SnapshotState::Failed | SnapshotState::Partial | SnapshotState::Aborted
		)
	}

	pub fn is_terminal(&self) -> bool {
		self.is_success() || self.is_failure()
	}
}

impl fmt::Display for SnapshotState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SnapshotState::Success => write!(f, "SUCCESS"),
			SnapshotState::Failed => write!(f, "FAILED"),
			SnapshotState::Partial => write!(f, "PARTIAL"),
			SnapshotState::Aborted => write!(f, "ABORTED"),
			SnapshotState::InProgress => write!(f, "IN_PROGRESS"),
			SnapshotState::Started => write!(f, "STARTED"),
			SnapshotState::Init => write!(f, "INIT"),
			SnapshotState::Other(raw) => write!(f, "{raw}"),
		}
	}
}

/// A request to snapshot exactly one index
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
	pub repository: String,
	pub snapshot: String,
	pub index: String,
}

impl SnapshotRequest {
	pub fn new(repository: &str, snapshot: &str, index: &str) -> Self {
		Self {
			repository: repository.to_string(),
			snapshot: snapshot.to_string(),
			index: index.to_string(),
		}
	}

	/// Request body for `PUT /_snapshot/{repository}/{snapshot}`
	pub fn body(&self) -> CreateSnapshotBody<'_> {
		CreateSnapshotBody {
			indices: &self.index,
			ignore_unavailable: true,
			include_global_state: false,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct CreateSnapshotBody<'a> {
	pub indices: &'a str,
	pub ignore_unavailable: bool,
	pub include_global_state: bool,
}

/// Response of `GET /_snapshot/{repository}/{snapshot}/_status`
#[derive(Debug, Deserialize)]
pub struct SnapshotStatusResponse {
	#[serde(default)]
	pub snapshots: Vec<SnapshotStatusEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotStatusEntry {
	#[serde(default)]
	pub snapshot: Option<String>,
	pub state: SnapshotState,
}

/// Error envelope returned by the cluster on non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
	Structured {
		#[serde(rename = "type", default)]
		kind: Option<String>,
		#[serde(default)]
		reason: Option<String>,
	},
	Plain(String),
}

impl ErrorDetail {
	pub fn describe(&self) -> String {
		match self {
			ErrorDetail::Structured { kind, reason } => match (kind, reason) {
				(Some(kind), Some(reason)) => format!("{kind}: {reason}"),
				(None, Some(reason)) => reason.clone(),
				(Some(kind), None) => kind.clone(),
				(None, None) => "unknown error".to_string(),
			},
			ErrorDetail::Plain(message) => message.clone(),
		}
	}
}
