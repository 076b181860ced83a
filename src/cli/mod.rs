//! CLI module for CorteFácil
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// CorteFácil highlight reel
///
/// Samples key moments across a video, records a short segment around each
/// one and compiles them into a single clip between one and three minutes.
#[derive(Parser, Debug)]
#[command(name = "cortefacil")]
#[command(about = "CorteFácil - Automatic highlight reels from long videos")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a highlight reel from a video file
    Highlight(args::HighlightArgs),
    /// Show the key moments that would be captured, without recording
    Moments(args::MomentsArgs),
    /// Show duration and media type of a video file
    Probe(args::ProbeArgs),
}

impl Cli {
    /// Explicit config file given to `highlight` or `moments`
    pub fn config_path(&self) -> Option<&std::path::Path> {
        match &self.command {
            Commands::Highlight(args) => args.config.as_deref(),
            Commands::Moments(args) => args.config.as_deref(),
            Commands::Probe(_) => None,
        }
    }
}
