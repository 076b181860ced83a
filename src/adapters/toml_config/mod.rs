// TOML config adapter - Typed configuration loaded from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::logging::{LogFormat, LogLevel};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "cortefacil.toml";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "CORTEFACIL_";

/// Contents of the `[highlight]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub sensitivity: i64,
    pub segment_length: i64,
    pub min_total: f64,
    pub max_total: f64,
    pub output_prefix: String,
    pub capture_timeslice_ms: u64,
    pub failure_policy: FailurePolicy,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            sensitivity: i64::from(Sensitivity::default().value()),
            segment_length: i64::from(SegmentLength::default().seconds()),
            min_total: DEFAULT_MIN_TOTAL,
            max_total: DEFAULT_MAX_TOTAL,
            output_prefix: "processed".to_string(),
            capture_timeslice_ms: 1000,
            failure_policy: FailurePolicy::Abort,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    highlight: HighlightConfig,
}

impl HighlightConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> DomainResult<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.highlight)
    }

    /// Read and parse a config file
    pub fn load_file(path: &Path) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&content)
    }

    /// Serialize back into a `[highlight]` document
    pub fn to_toml_string(&self) -> DomainResult<String> {
        let file = ConfigFile {
            highlight: self.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Explicit path if given, else the default file when it exists
    pub fn locate(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        }
    }

    /// Apply `CORTEFACIL_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> DomainResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));
        let mut applied = 0;

        if let Some(value) = var("SENSITIVITY") {
            self.sensitivity = parse_env("SENSITIVITY", &value)?;
            applied += 1;
        }
        if let Some(value) = var("SEGMENT_LENGTH") {
            self.segment_length = parse_env("SEGMENT_LENGTH", &value)?;
            applied += 1;
        }
        if let Some(value) = var("MIN_TOTAL") {
            self.min_total = parse_env("MIN_TOTAL", &value)?;
            applied += 1;
        }
        if let Some(value) = var("MAX_TOTAL") {
            self.max_total = parse_env("MAX_TOTAL", &value)?;
            applied += 1;
        }
        if let Some(value) = var("OUTPUT_PREFIX") {
            self.output_prefix = value;
            applied += 1;
        }
        if let Some(value) = var("CAPTURE_TIMESLICE_MS") {
            self.capture_timeslice_ms = parse_env("CAPTURE_TIMESLICE_MS", &value)?;
            applied += 1;
        }
        if let Some(value) = var("FAILURE_POLICY") {
            self.failure_policy = match value.trim().to_lowercase().as_str() {
                "abort" => FailurePolicy::Abort,
                "skip_segment" | "skip" => FailurePolicy::SkipSegment,
                other => {
                    return Err(DomainError::Config(format!(
                        "Invalid failure policy: {}. Valid policies: abort, skip_segment",
                        other
                    )))
                }
            };
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log_level = LogLevel::parse(&value)?;
            applied += 1;
        }
        if let Some(value) = var("LOG_FORMAT") {
            self.log_format = LogFormat::parse(&value)?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Check every value and the relations between them
    pub fn validate(&self) -> DomainResult<()> {
        Sensitivity::new(self.sensitivity).map_err(into_config)?;
        let segment_length = SegmentLength::new(self.segment_length).map_err(into_config)?;
        DurationBounds::new(self.min_total, self.max_total).map_err(into_config)?;

        if self.max_total < segment_length.as_secs_f64() {
            return Err(DomainError::Config(format!(
                "max_total ({}) is shorter than segment_length ({})",
                self.max_total, self.segment_length
            )));
        }
        if self.max_total - self.min_total < segment_length.as_secs_f64() {
            return Err(DomainError::Config(format!(
                "min_total..max_total ({}..{}) must span at least one segment_length ({})",
                self.min_total, self.max_total, self.segment_length
            )));
        }
        if self.capture_timeslice_ms == 0 {
            return Err(DomainError::Config(
                "capture_timeslice_ms must be greater than zero".to_string(),
            ));
        }
        if self.output_prefix.trim().is_empty() {
            return Err(DomainError::Config("output_prefix cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn sensitivity(&self) -> DomainResult<Sensitivity> {
        Sensitivity::new(self.sensitivity)
    }

    pub fn segment_length(&self) -> DomainResult<SegmentLength> {
        SegmentLength::new(self.segment_length)
    }

    pub fn bounds(&self) -> DomainResult<DurationBounds> {
        DurationBounds::new(self.min_total, self.max_total)
    }

    pub fn capture_timeslice(&self) -> Duration {
        Duration::from_millis(self.capture_timeslice_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> DomainResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        DomainError::Config(format!("Invalid value for {}{}: {} ({})", ENV_PREFIX, key, value, e))
    })
}

fn into_config(error: DomainError) -> DomainError {
    match error {
        DomainError::InvalidInput(msg) => DomainError::Config(msg),
        other => other,
    }
}
