//! Configuration validation for backend-specific settings.
//!
//! Backends receive their settings as raw TOML tables. Each backend describes
//! the fields it understands with a [`Schema`] so that typos and wrong types
//! are rejected at startup rather than at first use.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// Error that occurs when a field is not part of the schema.
	#[error("Unknown field: {0}")]
	UnknownField(String),
}

/// Type alias for field validator functions.
///
/// Validators run after the type check and return an error message on failure.
pub type FieldValidator = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// An optional string setting with an optional custom validator.
pub struct Field {
	pub name: String,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			validator: None,
		}
	}

	/// Adds a custom validator to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		let value = value.as_str().ok_or_else(|| ValidationError::TypeMismatch {
			field: self.name.clone(),
			expected: "string".to_string(),
			actual: value.type_str().to_string(),
		})?;

		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Validation schema for a TOML table.
///
/// Every field is optional; keys the schema does not list are rejected.
#[derive(Debug, Default)]
pub struct Schema {
	pub fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Self { fields }
	}

	/// Validates a TOML value against this schema.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - the value is not a table
	/// - a field is not a string or fails its validator
	/// - the table contains a field the schema does not know
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for (key, value) in table {
			let field = self
				.fields
				.iter()
				.find(|f| &f.name == key)
				.ok_or_else(|| ValidationError::UnknownField(key.clone()))?;
			field.check(value)?;
		}

		Ok(())
	}
}

/// A configuration schema that can validate TOML values.
///
/// Implemented by each storage backend so startup can check every
/// `[storage.implementations.<name>]` table, not only the primary one.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(src: &str) -> toml::Value {
		toml::from_str(src).unwrap()
	}

	fn schema() -> Schema {
		Schema::new(vec![Field::new("path").with_validator(|s| {
			if s.trim().is_empty() {
				Err("must not be empty".to_string())
			} else {
				Ok(())
			}
		})])
	}

	#[test]
	fn test_valid_table() {
		assert!(schema().validate(&table("path = \"a.jsonl\"")).is_ok());
		assert!(schema().validate(&table("")).is_ok());
	}

	#[test]
	fn test_type_mismatch() {
		assert!(matches!(
			schema().validate(&table("path = 3")),
			Err(ValidationError::TypeMismatch { expected, .. }) if expected == "string"
		));
		assert!(matches!(
			schema().validate(&toml::Value::String("x".into())),
			Err(ValidationError::TypeMismatch { field, .. }) if field == "root"
		));
	}

	#[test]
	fn test_validator() {
		assert!(matches!(
			schema().validate(&table("path = \"  \"")),
			Err(ValidationError::InvalidValue { field, .. }) if field == "path"
		));
	}

	#[test]
	fn test_unknown_field() {
		assert!(matches!(
			schema().validate(&table("path = \"x\"\npaht = \"y\"")),
			Err(ValidationError::UnknownField(f)) if f == "paht"
		));
		assert!(matches!(
			Schema::default().validate(&table("path = \"x\"")),
			Err(ValidationError::UnknownField(_))
		));
	}
}
