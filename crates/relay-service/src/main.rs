//! Main entry point for the order relay service.
//!
//! This binary wires the concrete implementations together: the in-memory
//! order store, the Telegram messenger transport, the lifecycle engine, and
//! the HTTP intake surface.

use clap::Parser;
use relay_config::Config;
use relay_core::{EngineSettings, OrderEngine};
use relay_delivery::implementations::telegram::TelegramMessenger;
use relay_delivery::DeliveryService;
use relay_storage::implementations::memory::create_store as create_memory_store;
use relay_storage::OrderStore;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the relay service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the relay service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the lifecycle engine with its collaborators
/// 5. Serves the HTTP intake surface until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started order relay");

	let config = Config::from_file(
		args.config
			.to_str()
			.ok_or("Invalid configuration path")?,
	)
	.await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine(&config)?);

	server::start_server(config, engine).await?;

	tracing::info!("Stopped order relay");
	Ok(())
}

/// Builds the lifecycle engine from configuration.
///
/// Selects the store backend and messenger transport by name, so new
/// implementations slot in without touching the engine.
fn build_engine(config: &Config) -> Result<OrderEngine, Box<dyn std::error::Error>> {
	let store: Arc<dyn OrderStore> = match config.storage.primary.as_str() {
		"memory" => {
			let backend_config = config
				.storage
				.implementations
				.get("memory")
				.cloned()
				.unwrap_or(toml::Value::Table(toml::map::Map::new()));
			Arc::from(create_memory_store(&backend_config)?)
		},
		other => return Err(format!("Unknown storage implementation '{}'", other).into()),
	};

	let delivery = match &config.messaging {
		Some(messaging) => match messaging.implementation.as_str() {
			"telegram" => DeliveryService::new(Box::new(TelegramMessenger::new(
				messaging.api_url.clone(),
				messaging.bot_token.clone(),
			)?)),
			other => {
				return Err(format!("Unknown messenger implementation '{}'", other).into())
			},
		},
		None => {
			tracing::warn!("Messaging not configured, notifications will be dropped");
			DeliveryService::disabled()
		},
	};

	let settings = EngineSettings {
		btc_address: config.payment.btc_address.clone(),
		operator_chat_id: config.messaging.as_ref().map(|m| m.operator_chat_id),
		operator_secret: config.admin.secret.clone(),
		list_default_limit: config.admin.default_limit,
		list_max_limit: config.admin.max_limit,
	};

	Ok(OrderEngine::new(store, Arc::new(delivery), settings))
}
