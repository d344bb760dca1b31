//! Registry trait for self-registering implementations.
//!
//! Every pluggable backend exposes a `Registry` type implementing this trait so
//! the service can build a name-to-factory table without hard-coding backends.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. `"file"` for `[storage.implementations.file]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds this implementation from its config table.
	fn factory() -> Self::Factory;
}
