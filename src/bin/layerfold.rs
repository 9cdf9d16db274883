//! layerfold CLI Binary
//!
//! Command-line interface for the layerfold configuration pipeline.

use clap::Parser;
use layerfold::cli::{map_error, Cli, RunContext};
use layerfold::config::{Settings, SettingsLoader};
use layerfold::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &settings);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("layerfold starting");

    let context = RunContext::with_settings(&cli, settings);
    match context.execute(&cli.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, layerfold::error::LoadError> {
    match &cli.config {
        Some(path) => SettingsLoader::load_from_file(path),
        None => SettingsLoader::new(&cli.workspace).load(),
    }
}

/// Build logging configuration from CLI args and settings.
/// Precedence: CLI flags override settings override defaults.
fn build_logging_config(cli: &Cli, settings: &Settings) -> LoggingConfig {
    let mut config = settings.logging.clone();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
