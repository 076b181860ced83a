//! CorteFácil highlight reel
//!
//! Compiles a one to three minute highlight clip from a longer video.
//!
//! # Usage
//!
//! ```bash
//! cortefacil highlight --input talk.mp4 --sensitivity 80 --segment-length 20
//! cortefacil moments --input talk.mp4
//! cortefacil probe --input talk.mp4 --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use cortefacil::cli::{commands, Cli, Commands};
use cortefacil::config_initialization::initialize_configuration_hierarchy;
use cortefacil::utils::logging::LoggingSystem;

/// Main entry point for the CorteFácil CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let resolved = initialize_configuration_hierarchy(&cli).context("Failed to load configuration")?;

    // Initialize logging
    let logging = LoggingSystem::new(resolved.logging());
    logging.initialize();
    logging.log_system_info();
    resolved.log_sources();

    cortefacil::init().context("Failed to initialize media backend")?;

    // Execute the requested command
    match cli.command {
        Commands::Highlight(args) => {
            info!("Executing highlight command");
            commands::highlight(args, &resolved).await?;
        }
        Commands::Moments(args) => {
            info!("Executing moments command");
            commands::moments(args, &resolved).await?;
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            commands::probe(args).await?;
        }
    }

    Ok(())
}
