//! Liveness route.
//!
//! The relay probes this route before forwarding an order event, so it
//! never touches the event log and ignores any order-info header.

/// Handles GET on the health route.
pub async fn handle_ping() -> &'static str {
	"PONG"
}
