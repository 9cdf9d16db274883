//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{LoadError, PipelineError};
use owo_colors::OwoColorize;

/// Map load and pipeline errors to a string for CLI output.
pub fn map_error(e: &LoadError) -> String {
    let category = match e {
        LoadError::Pipeline(inner) => pipeline_category(inner),
        LoadError::Io { .. } | LoadError::Parse { .. } | LoadError::UnsupportedFormat(_) => {
            "load"
        }
        LoadError::Environment { .. } => "environment",
        LoadError::Config(_) => "settings",
        LoadError::UnsetKey(_) => "query",
        LoadError::Render(_) => "output",
    };
    format!("{} {}", format!("{} error:", category).red().bold(), e)
}

fn pipeline_category(e: &PipelineError) -> &'static str {
    match e {
        PipelineError::DuplicateOrigin { .. } | PipelineError::SchemaConflict { .. } => "merge",
        PipelineError::ModuleCycle { .. }
        | PipelineError::UnknownModule { .. }
        | PipelineError::InvalidModuleList { .. } => "resolve",
        PipelineError::MissingOption { .. }
        | PipelineError::OptionType { .. }
        | PipelineError::UnknownOption { .. } => "options",
        PipelineError::InvalidTransition { .. } => "pipeline",
    }
}
