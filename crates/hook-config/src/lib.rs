//! Configuration for the order webhook endpoint.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are replaced with environment variables before parsing, and a file may pull
//! in others with `include = ["other.toml"]` as long as every top-level
//! section is defined exactly once across all files.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Listener and static content settings.
	#[serde(default)]
	pub server: ServerConfig,
	/// Routes and the header carrying order information.
	#[serde(default)]
	pub webhook: WebhookConfig,
	/// Event log backend selection.
	pub storage: StorageConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// Document root for paths that match no route. Unknown paths are a
	/// plain 404 when unset.
	#[serde(default)]
	pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			static_dir: None,
		}
	}
}

fn default_host() -> String {
	"127.0.0.1".to_string()
}

fn default_port() -> u16 {
	8080
}

/// Webhook routing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
	/// Request header carrying `<order_id>,<status>`.
	#[serde(default = "default_header")]
	pub header: String,
	/// Route that validates and logs order events.
	#[serde(default = "default_intake_path")]
	pub intake_path: String,
	/// Liveness route answering `PONG`.
	#[serde(default = "default_health_path")]
	pub health_path: String,
}

impl Default for WebhookConfig {
	fn default() -> Self {
		Self {
			header: default_header(),
			intake_path: default_intake_path(),
			health_path: default_health_path(),
		}
	}
}

fn default_header() -> String {
	"UP42-Order-Info".to_string()
}

fn default_intake_path() -> String {
	"/input".to_string()
}

fn default_health_path() -> String {
	"/ping".to_string()
}

/// Configuration for the event log backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of implementation names to their backend-specific settings.
	pub implementations: HashMap<String, toml::Value>,
}

impl StorageConfig {
	/// Returns the settings table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default`
/// for `${VAR_NAME:-default}` when the variable is unset.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};

		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let config = loader::ConfigLoader::new(base_dir)
			.load_config(file_name)
			.await?;
		tracing::debug!(path = %path.display(), "Loaded configuration");
		Ok(config)
	}

	/// Parses TOML whose environment references are already substituted.
	pub(crate) fn from_resolved(resolved: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks cross-field constraints serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.webhook.header.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Webhook header name cannot be empty".into(),
			));
		}
		if !self
			.webhook
			.header
			.bytes()
			.all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
		{
			return Err(ConfigError::Validation(format!(
				"Webhook header '{}' is not a valid HTTP header name",
				self.webhook.header
			)));
		}

		for (name, route) in [
			("intake_path", &self.webhook.intake_path),
			("health_path", &self.webhook.health_path),
		] {
			// Captures and wildcards would make the router panic
			let has_capture = route.contains(['{', '}', '*'])
				|| route.split('/').any(|segment| segment.starts_with(':'));
			if !route.starts_with('/') || route.len() < 2 || has_capture {
				return Err(ConfigError::Validation(format!(
					"webhook.{} must start with '/' and name a route, got '{}'",
					name, route
				)));
			}
		}
		if self.webhook.intake_path == self.webhook.health_path {
			return Err(ConfigError::Validation(
				"webhook.intake_path and webhook.health_path must differ".into(),
			));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if self.storage.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' has no entry in [storage.implementations]",
				self.storage.primary
			)));
		}

		Ok(())
	}
}

#[cfg(any(test, feature = "testing"))]
impl Config {
	/// Default routes and header, backed by the memory event log.
	pub fn memory_backed() -> Self {
		Self {
			server: ServerConfig::default(),
			webhook: WebhookConfig::default(),
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations: HashMap::from([(
					"memory".to_string(),
					toml::Value::Table(toml::map::Map::new()),
				)]),
			},
		}
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_resolved(&resolve_env_vars(s)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("HOOK_TEST_HOST", "localhost");
		std::env::set_var("HOOK_TEST_PORT", "5432");

		let input = "host = \"${HOOK_TEST_HOST}:${HOOK_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("HOOK_TEST_HOST");
		std::env::remove_var("HOOK_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${HOOK_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${HOOK_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("HOOK_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = MINIMAL.parse().unwrap();

		assert_eq!(config.server.host, "127.0.0.1");
		assert_eq!(config.server.port, 8080);
		assert!(config.server.static_dir.is_none());
		assert_eq!(config.webhook.header, "UP42-Order-Info");
		assert_eq!(config.webhook.intake_path, "/input");
		assert_eq!(config.webhook.health_path, "/ping");
		assert!(config.storage.primary_config().is_some());
	}

	#[test]
	fn test_full_config() {
		std::env::set_var("HOOK_TEST_LOG_PATH", "/var/log/orders.jsonl");

		let config: Config = r#"
[server]
host = "0.0.0.0"
port = 9000
static_dir = "./public"

[webhook]
header = "X-Order-Info"
intake_path = "/orders"
health_path = "/health"

[storage]
primary = "file"
[storage.implementations.file]
path = "${HOOK_TEST_LOG_PATH}"
"#
		.parse()
		.unwrap();

		assert_eq!(config.server.port, 9000);
		assert_eq!(config.server.static_dir, Some(PathBuf::from("./public")));
		assert_eq!(config.webhook.header, "X-Order-Info");
		assert_eq!(
			config.storage.primary_config().unwrap()["path"].as_str(),
			Some("/var/log/orders.jsonl")
		);

		std::env::remove_var("HOOK_TEST_LOG_PATH");
	}

	#[test]
	fn test_primary_must_be_configured() {
		let result = r#"
[storage]
primary = "file"
[storage.implementations.memory]
"#
		.parse::<Config>();

		assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("'file'")));
	}

	#[test]
	fn test_invalid_routes_rejected() {
		let same = format!(
			"[webhook]\nintake_path = \"/x\"\nhealth_path = \"/x\"\n{}",
			MINIMAL
		);
		assert!(matches!(
			same.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		let relative = format!("[webhook]\nintake_path = \"input\"\n{}", MINIMAL);
		assert!(matches!(
			relative.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		let captured = format!("[webhook]\nintake_path = \"/{{id}}\"\n{}", MINIMAL);
		assert!(matches!(
			captured.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		for legacy in ["/:input", "/orders/:id"] {
			let config = format!("[webhook]\nintake_path = \"{}\"\n{}", legacy, MINIMAL);
			assert!(matches!(
				config.parse::<Config>(),
				Err(ConfigError::Validation(msg)) if msg.contains(legacy)
			));
		}

		let inner_colon = format!("[webhook]\nhealth_path = \"/health:check\"\n{}", MINIMAL);
		assert!(inner_colon.parse::<Config>().is_ok());
	}

	#[test]
	fn test_invalid_header_rejected() {
		let config = format!("[webhook]\nheader = \"Order Info\"\n{}", MINIMAL);
		assert!(matches!(
			config.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_memory_backed_is_valid() {
		let config = Config::memory_backed();
		assert!(config.validate().is_ok());
		assert_eq!(config.storage.primary, "memory");
	}

	#[test]
	fn test_missing_storage_section() {
		assert!(matches!(
			"[server]\nport = 1".parse::<Config>(),
			Err(ConfigError::Parse(_))
		));
	}
}
