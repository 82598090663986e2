//! reqwest-backed [`ClusterClient`] for the OpenSearch/Elasticsearch REST API

use super::error::{ClusterError, ClusterResult};
use super::types::{ErrorResponse, SnapshotRequest, SnapshotState, SnapshotStatusResponse};
use super::ClusterClient;
use crate::config::{ClusterConfig, TransportConfig};
use reqwest::{Client, RequestBuilder, Response, Url};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct OpenSearchClient {
	http: Client,
	base_url: Url,
	username: String,
	password: String,
}

impl OpenSearchClient {
	/// Build a client for `base_url` with explicit transport settings
	pub fn new(
		base_url: &str, username: &str, password: &str, transport: &TransportConfig,
	) -> ClusterResult<Self> {
		let base_url = Url::parse(base_url)
			.map_err(|e| ClusterError::Other(format!("invalid cluster URL {base_url}: {e}")))?;

		if !transport.verify_certs {
			warn!(
				"TLS certificate verification is disabled for {}; only use this against trusted clusters",
				base_url
			);
		}

		let http = Client::builder()
			.timeout(transport.request_timeout)
			.connect_timeout(transport.connect_timeout)
			.danger_accept_invalid_certs(!transport.verify_certs)
			.build()
			.map_err(|e| ClusterError::Other(format!("failed to build HTTP client: {e}")))?;

		Ok(Self {
			http,
			base_url,
			username: username.to_string(),
			password: password.to_string(),
		})
	}

	pub fn from_config(config: &ClusterConfig) -> ClusterResult<Self> {
		Self::new(
			&config.base_url(),
			&config.username,
			&config.password,
			&config.transport(),
		)
	}

	fn endpoint(&self, segments: &[&str]) -> ClusterResult<Url> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| ClusterError::Other(format!("{} cannot be a base URL", self.base_url)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// Send an authenticated request and turn non-2xx responses into errors
	async fn send(&self, request: RequestBuilder) -> ClusterResult<Response> {
		let response = request
			.basic_auth(&self.username, Some(&self.password))
			.send()
			.await?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		let reason = match serde_json::from_str::<ErrorResponse>(&body) {
			Ok(parsed) => parsed.error.describe(),
			Err(_) if body.trim().is_empty() => status
				.canonical_reason()
				.unwrap_or("no response body")
				.to_string(),
			Err(_) => body,
		};

		debug!("Cluster responded {} with: {}", status, reason);
		Err(ClusterError::from_status(status.as_u16(), reason))
	}
}

#[async_trait::async_trait]
impl ClusterClient for OpenSearchClient {
	async fn list_indices(&self) -> ClusterResult<Vec<String>> {
		let url = self.endpoint(&["*", "_alias"])?;
		let response = self.send(self.http.get(url)).await?;
		let listing: BTreeMap<String, serde_json::Value> = response.json().await?;
		Ok(listing.into_keys().collect())
	}

	async fn create_snapshot(&self, request: &SnapshotRequest) -> ClusterResult<()> {
		let url = self.endpoint(&["_snapshot", &request.repository, &request.snapshot])?;
		self.send(self.http.put(url).json(&request.body())).await?;
		Ok(())
	}

	async fn snapshot_status(
		&self, repository: &str, snapshot: &str,
	) -> ClusterResult<SnapshotState> {
		let url = self.endpoint(&["_snapshot", repository, snapshot, "_status"])?;
		let response = self.send(self.http.get(url)).await?;
		let status: SnapshotStatusResponse = response.json().await?;

		status
			.snapshots
			.into_iter()
			.next()
			.map(|entry| entry.state)
			.ok_or_else(|| {
				ClusterError::Other(format!("no status returned for snapshot {snapshot}"))
			})
	}

	async fn delete_index(&self, index: &str) -> ClusterResult<()> {
		let url = self.endpoint(&[index])?;
		self.send(self.http.delete(url)).await?;
		Ok(())
	}
}
