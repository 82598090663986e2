//! Test helpers and fakes for the retention module

use super::waiter::Sleeper;
use crate::cluster::{ClusterClient, ClusterError, ClusterResult, SnapshotRequest, SnapshotState};
use crate::disk::{DiskError, DiskMonitor, DiskUsage};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	List,
	Create { index: String, snapshot: String },
	Status { snapshot: String },
	Delete { index: String },
}

/// ScriptedCluster: a ClusterClient whose answers are set up front.
///
/// Snapshot status scripts are keyed by index; the last scripted state
/// repeats once the script is exhausted, and unscripted snapshots succeed.
#[derive(Default)]
pub struct ScriptedCluster {
	indices: Vec<String>,
	list_error: Option<ClusterError>,
	create_errors: HashMap<String, ClusterError>,
	delete_errors: HashMap<String, ClusterError>,
	statuses: Mutex<HashMap<String, VecDeque<ClusterResult<SnapshotState>>>>,
	snapshots: Mutex<HashMap<String, String>>,
	calls: Mutex<Vec<Call>>,
}

impl ScriptedCluster {
	pub fn with_indices(indices: &[&str]) -> Self {
		Self {
			indices: indices.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	pub fn fail_listing(mut self, error: ClusterError) -> Self {
		self.list_error = Some(error);
		self
	}

	pub fn fail_create(mut self, index: &str, error: ClusterError) -> Self {
		self.create_errors.insert(index.to_string(), error);
		self
	}

	pub fn fail_delete(mut self, index: &str, error: ClusterError) -> Self {
		self.delete_errors.insert(index.to_string(), error);
		self
	}

	pub fn script_status(self, index: &str, states: Vec<ClusterResult<SnapshotState>>) -> Self {
		self.statuses
			.lock()
			.unwrap()
			.insert(index.to_string(), states.into());
		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn created(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Create { index, .. } => Some(index),
				_ => None,
			})
			.collect()
	}

	pub fn deleted(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Delete { index } => Some(index),
				_ => None,
			})
			.collect()
	}

	pub fn status_polls(&self, snapshot: &str) -> usize {
		self.calls()
			.iter()
			.filter(|call| matches!(call, Call::Status { snapshot: s } if s == snapshot))
			.count()
	}

	fn record(&self, call: Call) {
		self.calls.lock().unwrap().push(call);
	}
}

#[async_trait::async_trait]
impl ClusterClient for ScriptedCluster {
	async fn list_indices(&self) -> ClusterResult<Vec<String>> {
		self.record(Call::List);
		match &self.list_error {
			Some(error) => Err(error.clone()),
			None => Ok(self.indices.clone()),
		}
	}

	async fn create_snapshot(&self, request: &SnapshotRequest) -> ClusterResult<()> {
		self.record(Call::Create {
			index: request.index.clone(),
			snapshot: request.snapshot.clone(),
		});
		if let Some(error) = self.create_errors.get(&request.index) {
			return Err(error.clone());
		}
		self.snapshots
			.lock()
			.unwrap()
			.insert(request.snapshot.clone(), request.index.clone());
		Ok(())
	}

	async fn snapshot_status(
		&self, _repository: &str, snapshot: &str,
	) -> ClusterResult<SnapshotState> {
		self.record(Call::Status { snapshot: snapshot.to_string() });

		let index = match self.snapshots.lock().unwrap().get(snapshot) {
			Some(index) => index.clone(),
			None => return Err(ClusterError::from_status(404, "snapshot_missing_exception")),
		};

		let mut statuses = self.statuses.lock().unwrap();
		match statuses.get_mut(&index) {
			Some(script) if script.len() > 1 => {
				script.pop_front().unwrap_or(Ok(SnapshotState::Success))
			}
			Some(script) => script.front().cloned().unwrap_or(Ok(SnapshotState::Success)),
			None => Ok(SnapshotState::Success),
		}
	}

	async fn delete_index(&self, index: &str) -> ClusterResult<()> {
		self.record(Call::Delete { index: index.to_string() });
		match self.delete_errors.get(index) {
			Some(error) => Err(error.clone()),
			None => Ok(()),
		}
	}
}

/// ScriptedDisk: returns queued used-percent samples, repeating the last one
pub struct ScriptedDisk {
	samples: Mutex<VecDeque<Result<f64, DiskError>>>,
	taken: Mutex<usize>,
}

impl ScriptedDisk {
	pub fn new(samples: Vec<Result<f64, DiskError>>) -> Self {
		Self { samples: Mutex::new(samples.into()), taken: Mutex::new(0) }
	}

	pub fn constant(percent: f64) -> Self {
		Self::new(vec![Ok(percent)])
	}

	pub fn samples_taken(&self) -> usize {
		*self.taken.lock().unwrap()
	}

	fn next_sample(&self) -> Result<f64, DiskError> {
		*self.taken.lock().unwrap() += 1;
		let mut samples = self.samples.lock().unwrap();
		let sample = if samples.len() > 1 {
			samples.pop_front()
		} else {
			samples.front().cloned()
		};
		sample.unwrap_or(Ok(0.0))
	}
}

impl DiskMonitor for ScriptedDisk {
	fn usage(&self, _path: &Path) -> Result<DiskUsage, DiskError> {
		let percent = self.next_sample()?;
		Ok(DiskUsage {
			total_bytes: 1_000_000,
			used_bytes: (percent * 10_000.0).round() as u64,
		})
	}

	fn used_percent(&self, _path: &Path) -> Result<f64, DiskError> {
		self.next_sample()
	}
}

/// RecordingSleeper: remembers requested sleeps without sleeping
#[derive(Default)]
pub struct RecordingSleeper {
	sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
	pub fn count(&self) -> usize {
		self.sleeps.lock().unwrap().len()
	}

	pub fn total(&self) -> Duration {
		self.sleeps.lock().unwrap().iter().sum()
	}
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
	async fn sleep(&self, duration: Duration) {
		self.sleeps.lock().unwrap().push(duration);
	}
}

/// LogCapture: collects formatted log lines for the current thread.
///
/// `#[tokio::test]` runs on a current-thread runtime, so a thread-local
/// default subscriber sees everything the test future logs.
#[derive(Clone, Default)]
pub struct LogCapture {
	buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
	pub fn install(&self) -> tracing::subscriber::DefaultGuard {
		let subscriber = tracing_subscriber::fmt()
			.with_writer(self.clone())
			.with_ansi(false)
			.with_max_level(tracing::Level::INFO)
			.finish();
		tracing::subscriber::set_default(subscriber)
	}

	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
	}
}

pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CaptureWriter {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

impl<'a> MakeWriter<'a> for LogCapture {
	type Writer = CaptureWriter;

	fn make_writer(&'a self) -> Self::Writer {
		CaptureWriter(self.buffer.clone())
	}
}
