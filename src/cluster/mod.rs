//! Cluster access for the retention job
//!
//! The retention core only talks to the search cluster through the
//! [`ClusterClient`] capability trait, so it can run against the real REST API
//! or against scripted fakes in tests.
//!
//! # Module Organization
//!
//! - [`error`] - Closed set of cluster failure kinds
//! - [`types`] - Wire types for snapshot status responses
//! - [`http`] - `OpenSearchClient`, the reqwest-backed implementation

pub mod error;
pub mod http;
pub mod types;

pub use error::{ClusterError, ClusterResult};
pub use http::OpenSearchClient;
pub use types::{SnapshotRequest, SnapshotState};

/// Wire operations the retention job needs from the cluster
#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
	/// Names of every index in the cluster. Associated metadata is dropped.
	async fn list_indices(&self) -> ClusterResult<Vec<String>>;

	/// Start a snapshot of a single index in `repository`
	async fn create_snapshot(&self, request: &SnapshotRequest) -> ClusterResult<()>;

	/// Current state of a previously requested snapshot
	async fn snapshot_status(
		&self, repository: &str, snapshot: &str,
	) -> ClusterResult<SnapshotState>;

	/// Delete an index
	async fn delete_index(&self, index: &str) -> ClusterResult<()>;
}
