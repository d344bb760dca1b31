//! Append-only event log for accepted order events.
//!
//! Records are stored as JSON Lines: one JSON array per line, never rewritten.
//! Backends only deal with whole lines; [`EventLogService`] turns order events
//! into [`LogRecord`]s and back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hook_types::{ConfigSchema, ImplementationRegistry, LogRecord, OrderEvent};
use std::sync::Arc;
use thiserror::Error;

pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during event log operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// A stored line is not a valid record.
	#[error("Corrupt record on line {line}: {message}")]
	Corrupt { line: usize, message: String },
}

/// Low-level interface for event log backends.
///
/// Backends store opaque lines in append order. Each `append_line` call must
/// either store the whole line or nothing, and concurrent appends must not
/// interleave.
#[async_trait]
pub trait EventLogInterface: Send + Sync {
	/// Appends one line. `line` carries no trailing newline.
	async fn append_line(&self, line: String) -> Result<(), StorageError>;

	/// Returns every stored line in append order.
	async fn read_lines(&self) -> Result<Vec<String>, StorageError>;

	/// Pushes buffered data to durable storage.
	async fn flush(&self) -> Result<(), StorageError> {
		Ok(())
	}
}

/// Type alias for event log factory functions.
pub type EventLogFactory = fn(&toml::Value) -> Result<Box<dyn EventLogInterface>, StorageError>;

/// Type alias for functions returning a backend's settings schema.
pub type SchemaFactory = fn() -> Box<dyn ConfigSchema>;

/// Registry trait for event log implementations.
pub trait EventLogRegistry: ImplementationRegistry<Factory = EventLogFactory> {
	/// Schema of the backend's `[storage.implementations.<name>]` table.
	fn config_schema() -> Box<dyn ConfigSchema>;
}

/// Get all registered event log implementations with their schemas.
pub fn get_all_implementations() -> Vec<(&'static str, EventLogFactory, SchemaFactory)> {
	use implementations::{file, memory};

	vec![
		(
			file::Registry::NAME,
			file::Registry::factory(),
			file::Registry::config_schema as SchemaFactory,
		),
		(
			memory::Registry::NAME,
			memory::Registry::factory(),
			memory::Registry::config_schema as SchemaFactory,
		),
	]
}

/// Source of capture timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Typed front end over an event log backend.
pub struct EventLogService {
	backend: Box<dyn EventLogInterface>,
	clock: Clock,
}

impl EventLogService {
	/// Creates a service stamping records with the system clock.
	pub fn new(backend: Box<dyn EventLogInterface>) -> Self {
		Self::with_clock(backend, Arc::new(Utc::now))
	}

	pub fn with_clock(backend: Box<dyn EventLogInterface>, clock: Clock) -> Self {
		Self { backend, clock }
	}

	/// Appends one record for `event`, stamped with the current time.
	pub async fn record(&self, event: &OrderEvent) -> Result<LogRecord, StorageError> {
		let record = LogRecord::new(event, (self.clock)());
		let line =
			serde_json::to_string(&record).map_err(|e| StorageError::Serialization(e.to_string()))?;

		self.backend.append_line(line).await?;
		tracing::debug!(
			order_id = %record.order_id,
			status = %record.status,
			"Recorded order event"
		);
		Ok(record)
	}

	/// Reads every record back in append order. Blank lines are skipped.
	pub async fn records(&self) -> Result<Vec<LogRecord>, StorageError> {
		let lines = self.backend.read_lines().await?;

		lines
			.iter()
			.enumerate()
			.filter(|(_, line)| !line.trim().is_empty())
			.map(|(idx, line)| {
				serde_json::from_str(line.trim_end_matches('\r')).map_err(|e| {
					StorageError::Corrupt {
						line: idx + 1,
						message: e.to_string(),
					}
				})
			})
			.collect()
	}

	pub async fn flush(&self) -> Result<(), StorageError> {
		self.backend.flush().await
	}
}
