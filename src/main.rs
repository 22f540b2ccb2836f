//! Main application entry point (server binary).
//!
//! This is a thin wrapper around the `domain_check` library that handles:
//! - Command-line and environment parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All request handling is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use domain_check::initialization::{init_crypto_provider, init_logger_with};
use domain_check::{run_server, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), falling back
    // to a .env next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config: Config = Opt::parse().into();

    init_logger_with(config.log_level.into(), config.log_format)
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    log::info!(
        "Starting domain_check {} (redirect strategy: {})",
        env!("CARGO_PKG_VERSION"),
        config.redirect_strategy
    );

    if let Err(e) = run_server(config).await {
        eprintln!("domain_check error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
