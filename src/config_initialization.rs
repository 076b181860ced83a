//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::HighlightConfig;
use crate::app::HighlightSettings;
use crate::cli::{Cli, Commands};
use crate::domain::errors::*;
use crate::domain::model::FailurePolicy;
use crate::ports::CaptureOptions;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Values given on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub sensitivity: Option<i64>,
    pub segment_length: Option<i64>,
    pub output_prefix: Option<String>,
    pub skip_failed: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl CliOverrides {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut overrides = Self {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format.clone(),
            ..Self::default()
        };
        match &cli.command {
            Commands::Highlight(args) => {
                overrides.sensitivity = args.sensitivity;
                overrides.segment_length = args.segment_length;
                overrides.output_prefix = args.prefix.clone();
                overrides.skip_failed = args.skip_failed;
            }
            Commands::Moments(args) => {
                overrides.sensitivity = args.sensitivity;
                overrides.segment_length = args.segment_length;
            }
            Commands::Probe(_) => {}
        }
        overrides
    }

    fn apply(&self, config: &mut HighlightConfig) -> DomainResult<usize> {
        let mut applied = 0;
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
            applied += 1;
        }
        if let Some(segment_length) = self.segment_length {
            config.segment_length = segment_length;
            applied += 1;
        }
        if let Some(prefix) = &self.output_prefix {
            config.output_prefix = prefix.clone();
            applied += 1;
        }
        if self.skip_failed {
            config.failure_policy = FailurePolicy::SkipSegment;
            applied += 1;
        }
        if let Some(level) = &self.log_level {
            config.log_level = LogLevel::parse(level)?;
            applied += 1;
        }
        if let Some(format) = &self.log_format {
            config.log_format = LogFormat::parse(format)?;
            applied += 1;
        }
        Ok(applied)
    }
}

/// Final configuration after every layer was applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: HighlightConfig,
    /// File that contributed values, if any
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

impl ResolvedConfig {
    pub fn settings(&self) -> DomainResult<HighlightSettings> {
        Ok(HighlightSettings {
            sensitivity: self.config.sensitivity()?,
            segment_length: self.config.segment_length()?,
            bounds: self.config.bounds()?,
            output_prefix: self.config.output_prefix.clone(),
            failure_policy: self.config.failure_policy,
            capture: CaptureOptions {
                muted: true,
                timeslice: self.config.capture_timeslice(),
            },
        })
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.config.log_level,
            format: self.config.log_format,
            ..LoggingConfig::default()
        }
    }

    /// Report where values came from, once logging is up
    pub fn log_sources(&self) {
        match &self.file {
            Some(path) => info!(path = %path.display(), "Loaded configuration file"),
            None => debug!("No configuration file, using defaults"),
        }
        if self.env_overrides > 0 {
            info!(count = self.env_overrides, "Applied environment overrides");
        }
        if self.cli_overrides > 0 {
            debug!(count = self.cli_overrides, "Applied command-line overrides");
        }
    }
}

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> DomainResult<ResolvedConfig> {
    let working_dir = std::env::current_dir()?;
    resolve_configuration(
        &CliOverrides::from_cli(cli),
        cli.config_path(),
        &working_dir,
        |key| std::env::var(key).ok(),
    )
}

/// Layered resolution with injectable file location and environment
pub fn resolve_configuration<F>(
    overrides: &CliOverrides,
    config_path: Option<&Path>,
    working_dir: &Path,
    env: F,
) -> DomainResult<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1: defaults, replaced by the file when one is found
    let file = HighlightConfig::locate(config_path, working_dir);
    let mut config = match &file {
        Some(path) => HighlightConfig::load_file(path)?,
        None => HighlightConfig::default(),
    };

    // Step 2: environment
    let env_overrides = config.apply_env(env)?;

    // Step 3: command line
    let cli_overrides = overrides.apply(&mut config)?;

    config.validate()?;

    Ok(ResolvedConfig {
        config,
        file,
        env_overrides,
        cli_overrides,
    })
}
