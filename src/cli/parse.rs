//! CLI parse: clap types for layerfold. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// layerfold - layered configuration composition and module activation planning
#[derive(Debug, Parser)]
#[command(name = "layerfold")]
#[command(about = "Merge layered configuration and plan module activation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Settings file path (overrides default settings loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User fragment file (overrides sources.user_file)
    #[arg(long, global = true)]
    pub fragment: Option<PathBuf>,

    /// Extra module descriptor file; may be repeated
    #[arg(long = "module-file", global = true)]
    pub module_files: Vec<PathBuf>,

    /// Ignore LAYERFOLD_CONFIG__* environment overrides
    #[arg(long, global = true)]
    pub no_env: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline and print the activation plan
    Resolve {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the effective value of a key and the origin that set it
    Explain {
        /// Dotted key path, e.g. googleFonts.display
        key: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Run the pipeline and report whether it succeeds
    Check,
    /// Print the fingerprint of the effective configuration
    Fingerprint,
}
