//! Configuration file loading and validation
//!
//! The tool is configured via a TOML file with a required `[cluster]` section
//! and a `[snapshot]` section that only `backup_delete` runs need.
//! `${VAR_NAME}` references inside string values are expanded from the
//! environment after the file is parsed, so credentials can stay out of the
//! file and may contain any character.
//!
//! ```toml
//! [cluster]
//! host = "10.0.0.5"
//! port = 9200
//! username = "admin"
//! password = "${OPENSEARCH_PASSWORD}"
//! verify_certs = false
//!
//! [snapshot]
//! repository_name = "backups"
//! retry_interval_secs = 30
//! max_retries = 20
//! disk_usage_threshold = 85
//! ```

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file {1}: {0}")]
	Io(std::io::Error, PathBuf),

	#[error("Failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("Configuration validation error: {0}")]
	Validation(String),
}

/// Root configuration loaded from the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
	/// Connection settings for the search cluster
	pub cluster: ClusterConfig,

	/// Archival settings; required only for backup-then-delete runs
	#[serde(default)]
	pub snapshot: Option<SnapshotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
	pub host: String,
	pub port: u16,
	pub username: String,
	pub password: String,

	/// Talk HTTPS to the cluster
	#[serde(default = "default_true")]
	pub use_ssl: bool,

	/// Validate the cluster's TLS certificate chain
	#[serde(default = "default_true")]
	pub verify_certs: bool,

	#[serde(default = "default_request_timeout")]
	pub request_timeout_secs: u64,

	#[serde(default = "default_connect_timeout")]
	pub connect_timeout_secs: u64,
}

/// Settings for the snapshot-then-delete mode
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
	/// Snapshot repository registered with the cluster
	pub repository_name: String,

	/// Seconds to sleep between snapshot status polls
	pub retry_interval_secs: u64,

	/// Maximum number of status polls before giving up on a snapshot
	pub max_retries: u32,

	/// Used-capacity percentage above which the batch stops
	pub disk_usage_threshold: f64,

	/// Filesystem whose capacity is checked
	#[serde(default = "default_disk_path")]
	pub disk_path: PathBuf,
}

/// Transport-level settings handed to the HTTP cluster client.
///
/// Built from [`ClusterConfig`] and passed explicitly to the client
/// constructor; nothing about certificate handling is process-global.
/// The scheme is not part of it: [`ClusterConfig::base_url`] already
/// carries `http` or `https`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
	pub verify_certs: bool,
	pub request_timeout: Duration,
	pub connect_timeout: Duration,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			verify_certs: true,
			request_timeout: Duration::from_secs(default_request_timeout()),
			connect_timeout: Duration::from_secs(default_connect_timeout()),
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_request_timeout() -> u64 {
	30
}

fn default_connect_timeout() -> u64 {
	10
}

fn default_disk_path() -> PathBuf {
	PathBuf::from("/")
}

impl AppConfig {
	/// Load configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path.as_ref())
			.map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

		Self::from_str(&contents)
	}

	/// Parse configuration from a TOML string.
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
		let mut document = toml::Value::Table(contents.parse::<toml::Table>()?);
		expand_env_in_value(&mut document)?;
		let config: AppConfig = document.try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Validate configuration parameters
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.cluster.validate()?;
		if let Some(snapshot) = &self.snapshot {
			snapshot.validate()?;
		}
		Ok(())
	}

	/// Snapshot settings for a backup run, or a descriptive error if the
	/// section is absent.
	pub fn backup_settings(&self) -> Result<&SnapshotConfig, ConfigError> {
		self.snapshot.as_ref().ok_or_else(|| {
			ConfigError::Validation(
				"the [snapshot] section is required for the backup_delete action".to_string(),
			)
		})
	}
}

impl ClusterConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.host.trim().is_empty() {
			return Err(ConfigError::Validation("cluster.host must not be empty".into()));
		}
		if self.port == 0 {
			return Err(ConfigError::Validation("cluster.port must be greater than 0".into()));
		}
		if self.username.trim().is_empty() {
			return Err(ConfigError::Validation("cluster.username must not be empty".into()));
		}
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"cluster.request_timeout_secs must be greater than 0".into(),
			));
		}
		Ok(())
	}

	/// Base URL of the cluster's REST endpoint
	pub fn base_url(&self) -> String {
		let scheme = if self.use_ssl { "https" } else { "http" };
		format!("{scheme}://{}:{}", self.host, self.port)
	}

	pub fn transport(&self) -> TransportConfig {
		TransportConfig {
			verify_certs: self.verify_certs,
			request_timeout: Duration::from_secs(self.request_timeout_secs),
			connect_timeout: Duration::from_secs(self.connect_timeout_secs),
		}
	}
}

impl SnapshotConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.repository_name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"snapshot.repository_name must not be empty".into(),
			));
		}
		if self.retry_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"snapshot.retry_interval_secs must be greater than 0".into(),
			));
		}
		if self.max_retries == 0 {
			return Err(ConfigError::Validation(
				"snapshot.max_retries must be greater than 0".into(),
			));
		}
		if !(0.0..=100.0).contains(&self.disk_usage_threshold) {
			return Err(ConfigError::Validation(format!(
				"snapshot.disk_usage_threshold must be between 0 and 100, got {}",
				self.disk_usage_threshold
			)));
		}
		Ok(())
	}

	pub fn retry_interval(&self) -> Duration {
		Duration::from_secs(self.retry_interval_secs)
	}
}

/// Expand `${VAR_NAME}` references in every string of a parsed document.
///
/// Comments are already gone at this point, and substituted values are never
/// re-read as TOML.
fn expand_env_in_value(value: &mut toml::Value) -> Result<(), ConfigError> {
	match value {
		toml::Value::String(text) => {
			if text.contains("${") {
				*text = expand_env_vars(text)?;
			}
		}
		toml::Value::Array(items) => {
			for item in items {
				expand_env_in_value(item)?;
			}
		}
		toml::Value::Table(table) => {
			for (_, item) in table.iter_mut() {
				expand_env_in_value(item)?;
			}
		}
		_ => {}
	}
	Ok(())
}

/// Expand `${VAR_NAME}` references in a single string value
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Validation(e.to_string()))?;
	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let Some(whole) = cap.get(0) else { continue };

		result.push_str(&input[last_end..whole.start()]);

		let var_name = &cap[1];
		let value = std::env::var(var_name)
			.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		result.push_str(&value);

		last_end = whole.end();
	}

	result.push_str(&input[last_end..]);
	Ok(result)
}
