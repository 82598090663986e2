//! Bounded polling of snapshot status
//!
//! Turns the cluster's asynchronous snapshot operation into a single
//! terminal answer. The wait is a plain poll/sleep loop with a fixed retry
//! budget; the sleep goes through [`Sleeper`] so tests can run it without
//! wall-clock delay.

use crate::cluster::ClusterClient;
use std::time::Duration;
use tracing::{info, warn};

/// Suspends the caller between polls
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
	async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// Polling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WaiterConfig {
	/// Delay between status queries
	pub poll_interval: Duration,
	/// Maximum number of status queries
	pub max_retries: u32,
}

impl WaiterConfig {
	/// Upper bound on time spent sleeping for one snapshot, saturating at
	/// `Duration::MAX`
	pub fn max_wait(&self) -> Duration {
		self.poll_interval.saturating_mul(self.max_retries)
	}
}

/// Terminal result of waiting on a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
	Succeeded,
	Failed(String),
	TimedOut { polls: u32 },
}

enum WaitState {
	Polling { retries: u32 },
	Done(WaitOutcome),
}

pub struct SnapshotWaiter<'a> {
	cluster: &'a dyn ClusterClient,
	sleeper: &'a dyn Sleeper,
	config: WaiterConfig,
}

impl<'a> SnapshotWaiter<'a> {
	pub fn new(cluster: &'a dyn ClusterClient, sleeper: &'a dyn Sleeper, config: WaiterConfig) -> Self {
		Self { cluster, sleeper, config }
	}

	/// Poll until the snapshot succeeds, fails, or the retry budget runs out.
	///
	/// A failed or partial snapshot ends the wait immediately. So does an
	/// error from the status query, since the snapshot's fate is then unknown.
	pub async fn await_completion(&self, repository: &str, snapshot: &str) -> WaitOutcome {
		let mut state = WaitState::Polling { retries: 0 };

		loop {
			state = match state {
				WaitState::Done(outcome) => return outcome,
				WaitState::Polling { retries } if retries >= self.config.max_retries => {
					warn!(
						"Snapshot {} did not complete after {} polls ({:?})",
						snapshot,
						retries,
						self.config.max_wait()
					);
					WaitState::Done(WaitOutcome::TimedOut { polls: retries })
				}
				WaitState::Polling { retries } => {
					self.poll_once(repository, snapshot, retries).await
				}
			};
		}
	}

	async fn poll_once(&self, repository: &str, snapshot: &str, retries: u32) -> WaitState {
		match self.cluster.snapshot_status(repository, snapshot).await {
			Ok(state) if state.is_terminal() => {
				if state.is_success() {
					info!("Snapshot {} completed ({}) after {} retries", snapshot, state, retries);
					WaitState::Done(WaitOutcome::Succeeded)
				} else {
					warn!("Snapshot {} ended in state {}", snapshot, state);
					WaitState::Done(WaitOutcome::Failed(format!("snapshot ended in state {state}")))
				}
			}
			Ok(state) => {
				info!("Waiting for snapshot {} to complete... (state: {})", snapshot, state);
				self.sleeper.sleep(self.config.poll_interval).await;
				WaitState::Polling { retries: retries + 1 }
			}
			Err(e) => WaitState::Done(WaitOutcome::Failed(format!(
				"status query failed: {e}"
			))),
		}
	}
}
