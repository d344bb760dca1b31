//! HTTP server for the order webhook endpoint.
//!
//! Every request first passes the GET-only filter, then is dispatched to the
//! intake route, the health route, or the static fallback.

use crate::apis;
use axum::{http::HeaderName, http::StatusCode, middleware, routing::get, Router};
use hook_config::{Config, WebhookConfig};
use hook_storage::EventLogService;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Shared application state for the request handlers.
#[derive(Clone)]
pub struct AppState {
	/// Event log opened at startup.
	pub event_log: Arc<EventLogService>,
	/// Header carrying the order information.
	pub order_header: HeaderName,
}

impl AppState {
	pub fn new(
		event_log: Arc<EventLogService>,
		webhook: &WebhookConfig,
	) -> Result<Self, axum::http::header::InvalidHeaderName> {
		Ok(Self {
			event_log,
			order_header: HeaderName::from_bytes(webhook.header.as_bytes())?,
		})
	}
}

/// Builds the router with the method filter applied to every route,
/// fallback included.
pub fn build_router(state: AppState, webhook: &WebhookConfig, static_dir: Option<&Path>) -> Router {
	let router = Router::new()
		.route(&webhook.intake_path, get(apis::intake::handle_intake))
		.route(&webhook.health_path, get(apis::health::handle_ping));

	let router = match static_dir {
		Some(dir) => router.fallback_service(ServeDir::new(dir)),
		None => router.fallback(|| async { StatusCode::NOT_FOUND }),
	};

	router
		.layer(middleware::from_fn(apis::method::require_get))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Starts the HTTP server and runs until a shutdown signal arrives.
///
/// The event log is flushed once in-flight requests have completed.
pub async fn start_server(
	config: &Config,
	event_log: Arc<EventLogService>,
) -> Result<(), Box<dyn std::error::Error>> {
	let state = AppState::new(Arc::clone(&event_log), &config.webhook)?;
	let app = build_router(state, &config.webhook, config.server.static_dir.as_deref());

	if let Some(dir) = &config.server.static_dir {
		tracing::info!("Serving static content from {}", dir.display());
	}

	let bind_address = format!("{}:{}", config.server.host, config.server.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order webhook endpoint listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	event_log.flush().await?;
	tracing::info!("Event log flushed");

	Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!("Failed to listen for Ctrl-C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!("Failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received");
}
