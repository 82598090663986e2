use anyhow::Context;
use chrono::Local;
use clap::{Parser, ValueEnum};
use index_retention::retention::{AbortReason, TokioSleeper};
use index_retention::{
	AppConfig, BackupSettings, OpenSearchClient, RetentionError, RetentionMode,
	RetentionOrchestrator, RunRequest, StatvfsDiskMonitor,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "index-retention")]
#[command(
	about = "Archives and deletes date-partitioned search indices older than a retention window"
)]
struct Cli {
	/// Indices strictly older than this many days are processed
	#[arg(long)]
	days: u32,

	/// Action to perform
	#[arg(long, value_enum)]
	action: Action,

	/// Path to the TOML configuration file
	#[arg(short, long, default_value = "retention.toml")]
	config: PathBuf,

	/// List what would be archived or deleted without changing anything
	#[arg(long)]
	dry_run: bool,

	/// Enable verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
	/// Snapshot each stale index, then delete it
	#[value(name = "backup_delete")]
	BackupDelete,
	/// Delete stale indices without a snapshot
	Delete,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	// RUST_LOG wins over --verbose
	let level = if cli.verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	info!("OpenSearch indices manager starting ({:?})", cli.action);

	let config = AppConfig::from_file(&cli.config)
		.with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

	let mode = match cli.action {
		Action::BackupDelete => {
			RetentionMode::BackupAndDelete(BackupSettings::from(config.backup_settings()?))
		}
		Action::Delete => RetentionMode::DeleteOnly,
	};

	let client = OpenSearchClient::from_config(&config.cluster)?;
	let orchestrator = RetentionOrchestrator::new(
		Arc::new(client),
		Arc::new(StatvfsDiskMonitor),
		Arc::new(TokioSleeper),
	);

	let request = RunRequest {
		mode,
		threshold_days: i64::from(cli.days),
		started_at: Local::now().naive_local(),
		dry_run: cli.dry_run,
	};

	let batch = match orchestrator.run(&request).await {
		Ok(batch) => batch,
		Err(e) => {
			error!(category = e.category(), "Retention run failed: {}", e);
			return Err(e.into());
		}
	};

	batch.log_summary();

	if let Some(AbortReason::DiskThreshold {
		used_percent,
		threshold_percent,
		after_index: None,
	}) = batch.aborted
	{
		return Err(RetentionError::DiskThresholdExceeded { used_percent, threshold_percent }.into());
	}

	Ok(())
}
