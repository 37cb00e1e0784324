//! Main entry point for the application.
//!
//! This module loads environment variables, command line arguments and the
//! optional configuration file, initializes logging, and serves the SQL API.

mod api;
mod cli;
mod config;
mod constants;
mod dialect;
mod engine;
mod errors;
mod utils;

use clap::Parser;
use config::ServiceConfig;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Load environment variables (they back the CLI options)
/// 2. Parse CLI arguments
/// 3. Load the configuration file, if any, and apply CLI overrides
/// 4. Initialize logging system
/// 5. Run the API server until shutdown
#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = cli::Cli::parse();

    let file_config = match &cli.config {
        Some(path) => match config::load_service_config(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Failed to load configuration from '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };
    let loaded_from_file = file_config.is_some();
    let config = file_config.unwrap_or_default().with_overrides(&cli);

    utils::init_logging(&config.logging);

    if let Err(e) = dotenv {
        warn!("Failed to load .env file: {}", e);
    }
    if loaded_from_file {
        info!("Loaded configuration from {:?}", cli.config);
    }
    debug!("Service configuration: {:?}", config);

    run(config).await
}

async fn run(config: ServiceConfig) -> ExitCode {
    match api::server::launch_server(&config.server).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to start server: {}", e);
            ExitCode::FAILURE
        }
    }
}
