//! JSON Lines file backend.
//!
//! The log file is opened once in append mode. Every line is written with a
//! single `write_all` while holding both an in-process mutex and an exclusive
//! advisory lock on the file, so concurrent writers in this or another
//! process never interleave within a line. A write that fails part-way is
//! truncated away before the lock is released.

use crate::{EventLogFactory, EventLogInterface, EventLogRegistry, StorageError};
use async_trait::async_trait;
use fs2::FileExt;
use hook_types::{ConfigSchema, Field, ImplementationRegistry, Schema, ValidationError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Default location of the event log.
pub const DEFAULT_LOG_PATH: &str = "./data/order_events.jsonl";

/// Append-only JSON Lines event log on the local filesystem.
pub struct FileEventLog {
	path: PathBuf,
	file: Arc<Mutex<File>>,
}

impl FileEventLog {
	/// Opens (creating if needed) the log file and its parent directories.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let path = path.into();

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|e| {
				StorageError::Backend(format!("Cannot create {}: {}", parent.display(), e))
			})?;
		}

		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&path)
			.map_err(|e| StorageError::Backend(format!("Cannot open {}: {}", path.display(), e)))?;

		tracing::info!(path = %path.display(), "Opened event log");
		Ok(Self {
			path,
			file: Arc::new(Mutex::new(file)),
		})
	}

	/// Runs `op` on the file on the blocking pool, holding the mutex.
	async fn with_file<F>(&self, op: F) -> Result<(), StorageError>
	where
		F: FnOnce(&mut File) -> std::io::Result<()> + Send + 'static,
	{
		let file = Arc::clone(&self.file);

		tokio::task::spawn_blocking(move || {
			let mut guard = file
				.lock()
				.map_err(|_| StorageError::Backend("Event log mutex poisoned".into()))?;
			op(&mut guard).map_err(|e| StorageError::Backend(e.to_string()))
		})
		.await
		.map_err(|e| StorageError::Backend(format!("Event log task failed: {}", e)))?
	}
}

/// Writes one line under an exclusive file lock.
fn append_locked(file: &mut File, line: &[u8]) -> std::io::Result<()> {
	<File as FileExt>::lock_exclusive(file)?;
	let written = append_whole_line(file, line);
	let unlocked = <File as FileExt>::unlock(file);
	written?;
	unlocked
}

/// File operations needed to undo a partial append.
trait AppendTarget: Write {
	fn current_len(&self) -> std::io::Result<u64>;
	fn truncate_to(&self, len: u64) -> std::io::Result<()>;
}

impl AppendTarget for File {
	fn current_len(&self) -> std::io::Result<u64> {
		Ok(self.metadata()?.len())
	}

	fn truncate_to(&self, len: u64) -> std::io::Result<()> {
		self.set_len(len)
	}
}

/// Appends `line` or leaves the file at its previous length.
///
/// Must run with the file lock held so no other writer moves the end.
fn append_whole_line(file: &mut impl AppendTarget, line: &[u8]) -> std::io::Result<()> {
	let previous_len = file.current_len()?;

	if let Err(e) = file.write_all(line).and_then(|_| file.flush()) {
		if let Err(truncate_err) = file.truncate_to(previous_len) {
			tracing::error!(
				len = previous_len,
				"Cannot remove partial event log line: {}",
				truncate_err
			);
		}
		return Err(e);
	}
	Ok(())
}

#[async_trait]
impl EventLogInterface for FileEventLog {
	async fn append_line(&self, line: String) -> Result<(), StorageError> {
		let mut bytes = line.into_bytes();
		if bytes.contains(&b'\n') {
			return Err(StorageError::Serialization(
				"Record contains a line break".into(),
			));
		}
		bytes.push(b'\n');

		self.with_file(move |file| append_locked(file, &bytes)).await
	}

	async fn read_lines(&self) -> Result<Vec<String>, StorageError> {
		let content = match tokio::fs::read_to_string(&self.path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		Ok(content.lines().map(str::to_string).collect())
	}

	async fn flush(&self) -> Result<(), StorageError> {
		self.with_file(|file| file.sync_data()).await?;
		tracing::debug!(path = %self.path.display(), "Flushed event log");
		Ok(())
	}
}

/// Configuration schema for FileEventLog.
pub struct FileEventLogSchema;

impl ConfigSchema for FileEventLogSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![Field::new("path").with_validator(|path| {
			if path.trim().is_empty() {
				Err("Path cannot be empty".to_string())
			} else {
				Ok(())
			}
		})]);

		schema.validate(config)
	}
}

/// Factory function to create a file event log from configuration.
///
/// Configuration parameters:
/// - `path`: location of the JSON Lines file (default: "./data/order_events.jsonl")
pub fn create_event_log(config: &toml::Value) -> Result<Box<dyn EventLogInterface>, StorageError> {
	FileEventLogSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_LOG_PATH);

	Ok(Box::new(FileEventLog::open(path)?))
}

/// Registry for the file event log implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = EventLogFactory;

	fn factory() -> Self::Factory {
		create_event_log
	}
}

impl EventLogRegistry for Registry {
	fn config_schema() -> Box<dyn ConfigSchema> {
		Box::new(FileEventLogSchema)
	}
}
