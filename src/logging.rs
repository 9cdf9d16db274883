//! Logging System
//!
//! Structured logging through `tracing`. Level, format, and destination come from
//! settings and may be overridden by `LAYERFOLD_LOG*` environment variables.
//! The core pipeline only emits events; rendering belongs to the subscriber.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "LAYERFOLD_LOG";
const LOG_FORMAT_ENV: &str = "LAYERFOLD_LOG_FORMAT";
const LOG_OUTPUT_ENV: &str = "LAYERFOLD_LOG_OUTPUT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// When false no subscriber is installed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path, required when output is "file"
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colored output (text format on a terminal stream only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `layerfold::merge = "trace"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        parse_format(&self.format)?;
        let output = parse_output(&self.output)?;
        if output == Output::File && self.file.is_none() {
            return Err("logging.output is \"file\" but logging.file is not set".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

/// Install the global subscriber.
///
/// Priority (highest first): `LAYERFOLD_LOG*` variables, then `config`, then defaults.
/// Installing twice is not an error; the first subscriber stays.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), LoadError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    if !config.enabled {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = match std::env::var(LOG_FORMAT_ENV) {
        Ok(value) => parse_format(&value),
        Err(_) => parse_format(&config.format),
    }
    .map_err(LoadError::Config)?;
    let output = match std::env::var(LOG_OUTPUT_ENV) {
        Ok(value) => parse_output(&value),
        Err(_) => parse_output(&config.output),
    }
    .map_err(LoadError::Config)?;

    let writer = match output {
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        Output::File => {
            let path = config.file.as_deref().ok_or_else(|| {
                LoadError::Config("logging.output is \"file\" but logging.file is not set".into())
            })?;
            BoxMakeWriter::new(open_log_file(path)?)
        }
    };
    let ansi = config.color && output != Output::File;

    let registry = Registry::default().with(filter);
    let result = match format {
        Format::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        Format::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    if let Err(err) = result {
        tracing::debug!(error = %err, "Logging already initialized");
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoadError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (target, level) in &config.modules {
        let directive = format!("{}={}", target, level)
            .parse()
            .map_err(|e| LoadError::Config(format!("Invalid log directive: {}", e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

fn parse_format(format: &str) -> Result<Format, String> {
    match format {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        )),
    }
}

fn parse_output(output: &str) -> Result<Output, String> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        other => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            other
        )),
    }
}
