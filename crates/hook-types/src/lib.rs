//! Common types for the order webhook relay endpoint.
//!
//! This crate defines the domain types shared by the configuration, storage
//! and service crates: order events parsed from the relay header, the records
//! appended to the event log, the HTTP response bodies and the configuration
//! validation helpers.

/// API response bodies and the error taxonomy of the HTTP surface.
pub mod api;
/// Order identifiers, statuses and the order-info header parser.
pub mod order;
/// Records appended to the JSON Lines event log.
pub mod record;
/// Self-registration trait for pluggable backends.
pub mod registry;
/// Configuration validation types for backend-specific settings.
pub mod validation;

pub use api::*;
pub use order::*;
pub use record::*;
pub use registry::ImplementationRegistry;
pub use validation::*;
