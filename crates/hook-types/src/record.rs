//! Event log records.
//!
//! Each accepted order event becomes one JSON array on its own line:
//! `["2026-10-16T12:34:56Z","a1b2c3-d4e5","fulfilled"]`.

use crate::{OrderEvent, OrderId, OrderStatus};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single line of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
	/// Capture time in UTC, truncated to whole seconds.
	pub timestamp: DateTime<Utc>,
	pub order_id: OrderId,
	pub status: OrderStatus,
}

impl LogRecord {
	/// Builds the record for `event` captured at `captured_at`.
	pub fn new(event: &OrderEvent, captured_at: DateTime<Utc>) -> Self {
		Self {
			timestamp: captured_at.trunc_subsecs(0),
			order_id: event.order_id.clone(),
			status: event.status,
		}
	}

	/// Formats the timestamp the way it is written to the log.
	pub fn timestamp_string(&self) -> String {
		self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
	}
}

impl Serialize for LogRecord {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		(self.timestamp_string(), &self.order_id, self.status).serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for LogRecord {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let (timestamp, order_id, status): (String, OrderId, OrderStatus) =
			Deserialize::deserialize(deserializer)?;
		let timestamp = DateTime::parse_from_rfc3339(&timestamp)
			.map_err(serde::de::Error::custom)?
			.with_timezone(&Utc);

		Ok(Self {
			timestamp,
			order_id,
			status,
		})
	}
}
