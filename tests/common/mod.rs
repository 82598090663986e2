//! Common test utilities for the index-retention integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use index_retention::disk::{DiskError, DiskMonitor, DiskUsage};
use index_retention::retention::Sleeper;
use index_retention::{OpenSearchClient, TransportConfig};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::MockServer;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// Start a mock cluster
pub async fn start_cluster() -> MockServer {
	MockServer::start().await
}

/// Plain-HTTP client pointed at a mock cluster
pub fn client_for(server: &MockServer) -> OpenSearchClient {
	client_for_url(&server.uri())
}

pub fn client_for_url(url: &str) -> OpenSearchClient {
	let transport = TransportConfig {
		request_timeout: Duration::from_secs(5),
		connect_timeout: Duration::from_secs(2),
		..Default::default()
	};
	OpenSearchClient::new(url, USERNAME, PASSWORD, &transport)
		.expect("Failed to build cluster client")
}

/// Midnight on 2024-01-01, the reference "now" for batch tests
pub fn new_year() -> NaiveDateTime {
	NaiveDate::from_ymd_opt(2024, 1, 1)
		.unwrap()
		.and_hms_opt(0, 0, 0)
		.unwrap()
}

/// Disk monitor that always reports the same usage
pub struct FixedDisk(pub f64);

impl DiskMonitor for FixedDisk {
	fn usage(&self, _path: &Path) -> Result<DiskUsage, DiskError> {
		Ok(DiskUsage {
			total_bytes: 100_000,
			used_bytes: (self.0 * 1_000.0) as u64,
		})
	}

	fn used_percent(&self, _path: &Path) -> Result<f64, DiskError> {
		Ok(self.0)
	}
}

/// Sleeper that returns immediately and counts calls
#[derive(Default)]
pub struct NoSleep {
	calls: Mutex<u32>,
}

impl NoSleep {
	pub fn calls(&self) -> u32 {
		*self.calls.lock().unwrap()
	}
}

#[async_trait::async_trait]
impl Sleeper for NoSleep {
	async fn sleep(&self, _duration: Duration) {
		*self.calls.lock().unwrap() += 1;
	}
}
