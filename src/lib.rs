pub mod cluster;
pub mod config;
pub mod disk;
mod error;
pub mod retention;

pub use cluster::{ClusterClient, ClusterError, OpenSearchClient};
pub use config::{AppConfig, ConfigError, TransportConfig};
pub use disk::{DiskMonitor, StatvfsDiskMonitor};
pub use error::{Result, RetentionError};
pub use retention::{
	BackupSettings, BatchOutcome, IndexOutcome, RetentionMode, RetentionOrchestrator, RunRequest,
};
