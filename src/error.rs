//! Error types for the layerfold configuration pipeline.

use crate::fragment::Origin;
use crate::merge::MergeKind;
use crate::pipeline::PipelineState;
use crate::value::ValueKind;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline errors. Every variant is fatal to the build invocation that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Duplicate {origin} fragment for scope '{}'", scope_label(.scope))]
    DuplicateOrigin {
        origin: Origin,
        scope: Option<String>,
    },

    #[error(
        "Schema conflict at '{key}': {first_origin} treats it as {first_kind}, \
         {second_origin} treats it as {second_kind}"
    )]
    SchemaConflict {
        key: String,
        first_origin: Origin,
        first_kind: MergeKind,
        second_origin: Origin,
        second_kind: MergeKind,
    },

    #[error("Module ordering cycle: {}", render_cycle(.cycle))]
    ModuleCycle { cycle: Vec<String> },

    #[error("Unknown module: {name} (no descriptor registered)")]
    UnknownModule { name: String },

    #[error("Module '{module}': missing required option '{option}'")]
    MissingOption { module: String, option: String },

    #[error("Module '{module}': option '{option}' expected {expected}, got {actual}")]
    OptionType {
        module: String,
        option: String,
        expected: String,
        actual: ValueKind,
    },

    #[error("Module '{module}': unknown option '{option}'")]
    UnknownOption { module: String, option: String },

    #[error("Invalid module list: entry {index} is a {actual}, expected a module name")]
    InvalidModuleList { index: usize, actual: ValueKind },

    #[error("Cannot {operation} while pipeline is {from}")]
    InvalidTransition {
        from: PipelineState,
        operation: &'static str,
    },
}

fn scope_label(scope: &Option<String>) -> &str {
    scope.as_deref().unwrap_or("<none>")
}

fn render_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => {
            let mut parts: Vec<&str> = cycle.iter().map(String::as_str).collect();
            parts.push(first);
            parts.join(" -> ")
        }
        None => String::new(),
    }
}

/// Errors raised while loading fragments, descriptors, or tool settings.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported fragment format: {} (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid environment override {key}: {message}")]
    Environment { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("'{0}' is not set in the effective configuration")]
    UnsetKey(String),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<config::ConfigError> for LoadError {
    fn from(err: config::ConfigError) -> Self {
        LoadError::Config(err.to_string())
    }
}
