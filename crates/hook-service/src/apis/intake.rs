//! Order-intake route.
//!
//! Reads the order-info header, validates it, appends one record to the
//! event log and echoes the parsed fields back. Nothing is written unless
//! the header parses.

use crate::server::AppState;
use axum::{
	extract::State,
	http::{HeaderMap, HeaderName},
	response::{IntoResponse, Json, Response},
};
use hook_types::{parse_order_info, ApiError, ApiResponse, OrderEvent};
use tracing::instrument;

/// Extracts and parses the order-info header.
fn order_event_from_headers(
	headers: &HeaderMap,
	header_name: &HeaderName,
) -> Result<OrderEvent, ApiError> {
	let value = headers
		.get(header_name)
		.ok_or_else(|| ApiError::Validation(format!("Missing header {}", header_name)))?;

	let value = value
		.to_str()
		.map_err(|_| ApiError::Validation(format!("Header {} is not visible ASCII", header_name)))?;

	parse_order_info(value).map_err(|e| ApiError::Validation(e.to_string()))
}

/// Handles GET on the intake route.
#[instrument(skip_all)]
pub async fn handle_intake(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ApiError> {
	let event = order_event_from_headers(&headers, &state.order_header).map_err(|e| {
		tracing::warn!("Rejected order event: {}", e);
		e
	})?;

	state.event_log.record(&event).await.map_err(|e| {
		tracing::error!(order_id = %event.order_id, "Failed to append order event: {}", e);
		ApiError::Internal(e.to_string())
	})?;

	tracing::info!(
		order_id = %event.order_id,
		status = %event.status,
		"Accepted order event"
	);

	Ok(Json(ApiResponse::accepted(&event)).into_response())
}
