//! In-memory event log backend.
//!
//! Keeps lines in a vector, useful for tests and dry runs where nothing
//! should touch the disk.

use crate::{EventLogFactory, EventLogInterface, EventLogRegistry, StorageError};
use async_trait::async_trait;
use hook_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory event log.
#[derive(Default)]
pub struct MemoryEventLog {
	lines: Arc<RwLock<Vec<String>>>,
}

impl MemoryEventLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Shared handle to the stored lines, for inspection after the log has
	/// been boxed into a service.
	pub fn handle(&self) -> Arc<RwLock<Vec<String>>> {
		Arc::clone(&self.lines)
	}
}

#[async_trait]
impl EventLogInterface for MemoryEventLog {
	async fn append_line(&self, line: String) -> Result<(), StorageError> {
		self.lines.write().await.push(line);
		Ok(())
	}

	async fn read_lines(&self) -> Result<Vec<String>, StorageError> {
		Ok(self.lines.read().await.clone())
	}
}

/// Configuration schema for MemoryEventLog.
pub struct MemoryEventLogSchema;

impl ConfigSchema for MemoryEventLogSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// No settings
		Schema::default().validate(config)
	}
}

/// Factory function to create a memory event log from configuration.
pub fn create_event_log(config: &toml::Value) -> Result<Box<dyn EventLogInterface>, StorageError> {
	MemoryEventLogSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	Ok(Box::new(MemoryEventLog::new()))
}

/// Registry for the memory event log implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = EventLogFactory;

	fn factory() -> Self::Factory {
		create_event_log
	}
}

impl EventLogRegistry for Registry {
	fn config_schema() -> Box<dyn ConfigSchema> {
		Box::new(MemoryEventLogSchema)
	}
}
