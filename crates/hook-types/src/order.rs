//! Order event types and the order-info header parser.
//!
//! The relay that receives provider webhooks forwards the interesting part of
//! each notification as a single header of the form
//! `<order_id>,<optional whitespace><order_status>`. This module turns that
//! header into a typed [`OrderEvent`] or explains why it cannot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing an order-info header value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// The value has no `,` between order ID and status.
	#[error("Missing ',' between order ID and status")]
	MissingSeparator,
	/// The order ID is empty or contains characters other than hex digits and `-`.
	#[error("Invalid order ID: {0:?}")]
	InvalidOrderId(String),
	/// The status is not one of the accepted literals.
	#[error("Unknown order status: {0:?}")]
	UnknownStatus(String),
}

/// Order identifier made of ASCII hex digits and hyphens.
///
/// Provider order IDs are UUIDs, but only the character set is enforced,
/// not the grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	fn is_valid_char(c: char) -> bool {
		c.is_ascii_hexdigit() || c == '-'
	}
}

impl FromStr for OrderId {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() || !s.chars().all(Self::is_valid_char) {
			return Err(ParseError::InvalidOrderId(s.to_string()));
		}
		Ok(Self(s.to_string()))
	}
}

impl<'de> Deserialize<'de> for OrderId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Terminal order statuses the endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Fulfilled,
	FailedPermanently,
}

impl OrderStatus {
	/// Returns the wire literal for this status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Fulfilled => "fulfilled",
			OrderStatus::FailedPermanently => "failed_permanently",
		}
	}
}

impl FromStr for OrderStatus {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"fulfilled" => Ok(OrderStatus::Fulfilled),
			"failed_permanently" => Ok(OrderStatus::FailedPermanently),
			other => Err(ParseError::UnknownStatus(other.to_string())),
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An order status notification received through the relay header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
	pub order_id: OrderId,
	pub status: OrderStatus,
}

impl FromStr for OrderEvent {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_order_info(s)
	}
}

/// Whitespace allowed between the comma and the status: space, tab, LF, VT, FF, CR.
fn is_separator_space(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Parses an order-info header value.
///
/// Accepts `<order_id>,<status>` where `order_id` is one or more hex digits or
/// hyphens, at most one whitespace character may follow the comma, and
/// `status` is exactly `fulfilled` or `failed_permanently` with nothing after it.
pub fn parse_order_info(value: &str) -> Result<OrderEvent, ParseError> {
	let (id, rest) = value.split_once(',').ok_or(ParseError::MissingSeparator)?;
	let order_id = id.parse::<OrderId>()?;
	let status = rest.strip_prefix(is_separator_space).unwrap_or(rest);
	let status = status.parse::<OrderStatus>()?;

	Ok(OrderEvent { order_id, status })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_without_space() {
		let event = parse_order_info("a1b2c3-d4e5,fulfilled").unwrap();
		assert_eq!(event.order_id.as_str(), "a1b2c3-d4e5");
		assert_eq!(event.status, OrderStatus::Fulfilled);
	}

	#[test]
	fn test_parse_with_single_space() {
		let event = parse_order_info("0A1b-FF, failed_permanently").unwrap();
		assert_eq!(event.order_id.as_str(), "0A1b-FF");
		assert_eq!(event.status, OrderStatus::FailedPermanently);
	}

	#[test]
	fn test_parse_with_tab() {
		let event = parse_order_info("abc,\tfulfilled").unwrap();
		assert_eq!(event.status, OrderStatus::Fulfilled);
	}

	#[test]
	fn test_parse_with_ascii_whitespace() {
		for sep in [" ", "\t", "\n", "\x0B", "\x0C", "\r"] {
			let event = parse_order_info(&format!("abc,{}failed_permanently", sep)).unwrap();
			assert_eq!(event.status, OrderStatus::FailedPermanently, "{:?}", sep);
		}
	}

	#[test]
	fn test_parse_rejects_non_ascii_whitespace() {
		assert_eq!(
			parse_order_info("abc,\u{a0}fulfilled"),
			Err(ParseError::UnknownStatus("\u{a0}fulfilled".to_string()))
		);
		assert!(parse_order_info("abc,\u{2003}fulfilled").is_err());
	}

	#[test]
	fn test_parse_uuid_order_id() {
		let event =
			parse_order_info("9f8e7d6c-5b4a-3c2d-1e0f-a9b8c7d6e5f4, fulfilled").unwrap();
		assert_eq!(
			event.order_id.to_string(),
			"9f8e7d6c-5b4a-3c2d-1e0f-a9b8c7d6e5f4"
		);
	}

	#[test]
	fn test_parse_rejects_two_spaces() {
		assert_eq!(
			parse_order_info("abc,  fulfilled"),
			Err(ParseError::UnknownStatus(" fulfilled".to_string()))
		);
	}

	#[test]
	fn test_parse_rejects_unknown_status() {
		assert_eq!(
			parse_order_info("a1b2c3-d4e5,pending"),
			Err(ParseError::UnknownStatus("pending".to_string()))
		);
		assert!(parse_order_info("abc,FULFILLED").is_err());
		assert!(parse_order_info("abc,fulfilled ").is_err());
		assert!(parse_order_info("abc,fulfilledx").is_err());
		assert!(parse_order_info("abc,").is_err());
	}

	#[test]
	fn test_parse_rejects_bad_order_id() {
		assert_eq!(
			parse_order_info(",fulfilled"),
			Err(ParseError::InvalidOrderId(String::new()))
		);
		assert!(matches!(
			parse_order_info("xyz-123,fulfilled"),
			Err(ParseError::InvalidOrderId(_))
		));
		assert!(parse_order_info(" abc,fulfilled").is_err());
		assert!(parse_order_info("ab_c,fulfilled").is_err());
	}

	#[test]
	fn test_parse_rejects_missing_separator() {
		assert_eq!(parse_order_info(""), Err(ParseError::MissingSeparator));
		assert_eq!(
			parse_order_info("abc fulfilled"),
			Err(ParseError::MissingSeparator)
		);
	}

	#[test]
	fn test_parse_rejects_extra_fields() {
		assert!(parse_order_info("abc,fulfilled,extra").is_err());
		assert!(parse_order_info("abc,,fulfilled").is_err());
	}

	#[test]
	fn test_status_serializes_to_wire_literal() {
		assert_eq!(
			serde_json::to_string(&OrderStatus::FailedPermanently).unwrap(),
			"\"failed_permanently\""
		);
		assert_eq!(
			serde_json::from_str::<OrderStatus>("\"fulfilled\"").unwrap(),
			OrderStatus::Fulfilled
		);
	}

	#[test]
	fn test_order_id_deserialize_validates() {
		assert!(serde_json::from_str::<OrderId>("\"abc-123\"").is_ok());
		assert!(serde_json::from_str::<OrderId>("\"not hex\"").is_err());
	}
}
