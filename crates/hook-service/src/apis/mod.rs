//! Request handlers for the webhook endpoint.

pub mod health;
pub mod intake;
pub mod method;
