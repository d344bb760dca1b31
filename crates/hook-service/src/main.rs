//! Main entry point for the order webhook endpoint.
//!
//! The service receives order status notifications forwarded by a webhook
//! relay, validates them and appends accepted events to a JSON Lines log.
//! The `events` subcommand reads that log back.

use clap::{Parser, Subcommand};
use hook_config::Config;
use hook_storage::EventLogService;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod factory_registry;
mod server;

/// Command-line arguments for the webhook endpoint.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "ORDERHOOK_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	/// Run the HTTP endpoint (default)
	Serve,
	/// Print every recorded order event as JSON Lines
	Events,
}

/// Main entry point.
///
/// Parses arguments, installs the tracing subscriber, loads the
/// configuration, opens the event log and runs the selected command.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// RUST_LOG wins over --log-level
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// stdout is reserved for `events` output
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", args.config.display());

	let event_log = Arc::new(factory_registry::build_event_log(&config)?);

	match args.command.unwrap_or(Command::Serve) {
		Command::Serve => {
			tracing::info!("Started order webhook endpoint");
			server::start_server(&config, event_log).await?;
			tracing::info!("Stopped order webhook endpoint");
		},
		Command::Events => {
			let count = print_events(&event_log, &mut std::io::stdout()).await?;
			tracing::info!("Printed {} order events", count);
		},
	}

	Ok(())
}

/// Writes every record of the event log to `out`, one JSON array per line.
async fn print_events(
	event_log: &EventLogService,
	out: &mut impl Write,
) -> Result<usize, Box<dyn std::error::Error>> {
	let records = event_log.records().await?;

	for record in &records {
		writeln!(out, "{}", serde_json::to_string(record)?)?;
	}
	out.flush()?;

	Ok(records.len())
}
