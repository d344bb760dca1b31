//! API response bodies for the webhook endpoint.
//!
//! Every JSON response shares the `{"code": <status>, "msg": <payload>}` shape.
//! Error bodies carry fixed messages so the relay can match on them.

use crate::{OrderEvent, OrderId, OrderStatus};
use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body message for rejected order-info headers.
pub const VALIDATION_MESSAGE: &str = "Incorrect order ID and/or status";
/// Body message for requests using any method other than GET.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "method not allowed";
/// Body message when an accepted event could not be written to the log.
pub const INTERNAL_MESSAGE: &str = "Failed to record order event";

/// JSON envelope used by every endpoint that answers with JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	/// Mirrors the HTTP status code.
	pub code: u16,
	pub msg: T,
}

impl<'a> ApiResponse<(&'a OrderId, OrderStatus)> {
	/// Echo body returned after an order event has been logged.
	pub fn accepted(event: &'a OrderEvent) -> Self {
		Self {
			code: StatusCode::OK.as_u16(),
			msg: (&event.order_id, event.status),
		}
	}
}

/// Request failures surfaced by the HTTP layer.
///
/// The `Display` text is for operator logs; clients only ever see the fixed
/// message of each variant.
#[derive(Debug, Error)]
pub enum ApiError {
	/// Non-GET request on any route (405).
	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),
	/// Missing or malformed order-info header (400).
	#[error("Validation failed: {0}")]
	Validation(String),
	/// The event could not be appended to the log (500).
	#[error("Internal error: {0}")]
	Internal(String),
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			ApiError::Validation(_) => StatusCode::BAD_REQUEST,
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Converts to the fixed JSON body sent to the client.
	pub fn to_response_body(&self) -> ApiResponse<&'static str> {
		let msg = match self {
			ApiError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED_MESSAGE,
			ApiError::Validation(_) => VALIDATION_MESSAGE,
			ApiError::Internal(_) => INTERNAL_MESSAGE,
		};
		ApiResponse {
			code: self.status_code().as_u16(),
			msg,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_response_body())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_bodies_are_fixed() {
		let cases = [
			(
				ApiError::MethodNotAllowed("POST".into()),
				r#"{"code":405,"msg":"method not allowed"}"#,
			),
			(
				ApiError::Validation("anything".into()),
				r#"{"code":400,"msg":"Incorrect order ID and/or status"}"#,
			),
			(
				ApiError::Internal("disk full".into()),
				r#"{"code":500,"msg":"Failed to record order event"}"#,
			),
		];

		for (error, expected) in cases {
			assert_eq!(
				serde_json::to_string(&error.to_response_body()).unwrap(),
				expected
			);
		}
	}

	#[test]
	fn test_accepted_echo_body() {
		let event = crate::parse_order_info("a1b2c3-d4e5,fulfilled").unwrap();

		assert_eq!(
			serde_json::to_string(&ApiResponse::accepted(&event)).unwrap(),
			r#"{"code":200,"msg":["a1b2c3-d4e5","fulfilled"]}"#
		);
	}

	#[test]
	fn test_status_codes() {
		assert_eq!(
			ApiError::Validation(String::new()).status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ApiError::MethodNotAllowed(String::new()).status_code(),
			StatusCode::METHOD_NOT_ALLOWED
		);
	}
}
