//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the highlight command
#[derive(Args, Debug)]
pub struct HighlightArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Key moment sensitivity (0-100); higher finds more moments
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..=100))]
    pub sensitivity: Option<i64>,

    /// Base segment length in seconds (5-60)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(i64).range(5..=60))]
    pub segment_length: Option<i64>,

    /// Directory the finished clip is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name prefix of the finished clip
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Skip segments that fail to record instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Configuration file (default: ./cortefacil.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the moments command
#[derive(Args, Debug)]
pub struct MomentsArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Key moment sensitivity (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..=100))]
    pub sensitivity: Option<i64>,

    /// Base segment length in seconds (5-60)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(i64).range(5..=60))]
    pub segment_length: Option<i64>,

    /// Configuration file (default: ./cortefacil.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
