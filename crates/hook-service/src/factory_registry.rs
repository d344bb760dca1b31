//! Registry of event log backends.
//!
//! Backends register themselves by name; the configuration picks one through
//! `storage.primary`.

use hook_config::Config;
use hook_storage::{EventLogFactory, EventLogService, SchemaFactory, StorageError};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Name-to-factory table for every compiled-in backend.
#[derive(Default)]
pub struct FactoryRegistry {
	pub event_log: HashMap<String, EventLogFactory>,
	pub schemas: HashMap<String, SchemaFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_event_log(
		&mut self,
		name: impl Into<String>,
		factory: EventLogFactory,
		schema: SchemaFactory,
	) {
		let name = name.into();
		self.schemas.insert(name.clone(), schema);
		self.event_log.insert(name, factory);
	}

	/// Sorted names of the registered backends, for error messages.
	fn available(&self) -> String {
		let mut names: Vec<_> = self.event_log.keys().map(String::as_str).collect();
		names.sort_unstable();
		names.join(", ")
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Get the global factory registry, populating it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory, schema) in hook_storage::get_all_implementations() {
			tracing::debug!("Registering event log implementation: {}", name);
			registry.register_event_log(name, factory, schema);
		}

		registry
	})
}

/// Builds the event log selected by the configuration.
///
/// Every configured implementation must be known and its settings must pass
/// the backend's schema, but only the primary one is opened.
pub fn build_event_log(config: &Config) -> Result<EventLogService, StorageError> {
	let registry = get_registry();

	let mut configured: Vec<_> = config.storage.implementations.iter().collect();
	configured.sort_unstable_by(|a, b| a.0.cmp(b.0));

	for (name, settings) in configured {
		let schema = registry.schemas.get(name).ok_or_else(|| {
			StorageError::Configuration(format!(
				"Unknown storage implementation '{}'. Available: [{}]",
				name,
				registry.available()
			))
		})?;
		schema().validate(settings).map_err(|e| {
			StorageError::Configuration(format!(
				"Invalid settings for storage implementation '{}': {}",
				name, e
			))
		})?;
	}

	let primary = &config.storage.primary;
	let settings = config.storage.primary_config().ok_or_else(|| {
		StorageError::Configuration(format!("Primary storage '{}' is not configured", primary))
	})?;
	let factory = registry.event_log.get(primary).ok_or_else(|| {
		StorageError::Configuration(format!(
			"Unknown storage implementation '{}'. Available: [{}]",
			primary,
			registry.available()
		))
	})?;

	let backend = factory(settings)?;
	tracing::info!(implementation = %primary, "Initialized event log");

	Ok(EventLogService::new(backend))
}
