//! Main entry point for the mealflow service.
//!
//! This binary wires the configured storage backend to the order lifecycle
//! engine and serves the REST API until interrupted.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use mealflow_config::Config;
use mealflow_core::{EventBus, OrderFlow, OrderStore, RestaurantStore};
use mealflow_storage::{StorageFactory, StorageService};
use mealflow_types::OrderEvent;

mod auth;
mod server;

use mealflow_storage::implementations::file::create_storage as create_file_storage;
use mealflow_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the mealflow service.
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

fn storage_factories() -> std::collections::HashMap<String, StorageFactory> {
	let mut factories: std::collections::HashMap<String, StorageFactory> =
		std::collections::HashMap::new();
	factories.insert("memory".to_string(), create_memory_storage);
	factories.insert("file".to_string(), create_file_storage);
	factories
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(backend = %config.storage.backend, "loaded configuration");

	// Resolve and validate the configured storage backend.
	let factories = storage_factories();
	let factory = factories.get(&config.storage.backend).ok_or_else(|| {
		format!(
			"unknown storage backend '{}' (available: memory, file)",
			config.storage.backend
		)
	})?;
	let backend = factory(&config.storage.config)?;
	backend
		.config_schema()
		.validate(&config.storage.config)
		.map_err(|e| format!("storage configuration invalid: {}", e))?;

	let storage = Arc::new(StorageService::new(backend));
	let flow = Arc::new(OrderFlow::new(
		Arc::new(OrderStore::new(storage.clone())),
		Arc::new(RestaurantStore::new(storage)),
		EventBus::default(),
		config.pricing.tax_rate,
	));

	// Log lifecycle events as they happen.
	let mut events = flow.events().subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			match event {
				OrderEvent::Placed { order } => {
					tracing::info!(order_id = %order.id, total = %order.totals.total, "event: order placed");
				}
				OrderEvent::StatusChanged {
					order_id,
					from,
					to,
					actor,
				} => {
					tracing::debug!(%order_id, %from, %to, role = %actor.role, "event: status changed");
				}
				OrderEvent::Claimed {
					order_id,
					delivery_person_id,
				} => {
					tracing::info!(%order_id, courier = %delivery_person_id, "event: order claimed");
				}
				OrderEvent::Cancelled { order_id, actor } => {
					tracing::info!(%order_id, role = %actor.role, "event: order cancelled");
				}
			}
		}
	});

	let state = server::AppState {
		flow,
		shared_secret: config.auth.shared_secret.clone(),
	};
	server::start_server(config.server, state).await?;

	tracing::info!("stopped mealflow service");
	Ok(())
}
