//! GET-only request filter.
//!
//! Runs ahead of route dispatch, so every route and the static fallback
//! answer non-GET requests with the same 405 body.

use axum::{
	extract::Request,
	http::{header, HeaderValue, Method},
	middleware::Next,
	response::{IntoResponse, Response},
};
use hook_types::ApiError;

/// Rejects any request whose method is not GET.
pub async fn require_get(request: Request, next: Next) -> Response {
	if request.method() == Method::GET {
		return next.run(request).await;
	}

	tracing::debug!(
		method = %request.method(),
		path = %request.uri().path(),
		"Rejected non-GET request"
	);

	let mut response = ApiError::MethodNotAllowed(request.method().to_string()).into_response();
	response
		.headers_mut()
		.insert(header::ALLOW, HeaderValue::from_static("GET"));
	response
}
