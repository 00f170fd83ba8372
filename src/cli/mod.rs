//! CLI module for Lesion Scan
//!
//! - `serve`: run the HTTP API
//! - `migrate`: create or upgrade the database schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Lesion Scan - skin lesion classification service
#[derive(Parser)]
#[command(name = "lesion-scan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Create or upgrade the database schema
    Migrate(migrate::MigrateArgs),
}

/// Load `.env` and layered configuration, then install logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
    }

    config
}
