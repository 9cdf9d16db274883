//! CLI route: single route table and run context. Dispatches to the pipeline and presentation.

use crate::cli::parse::{Cli, Commands, OutputFormat};
use crate::cli::presentation::{
    format_check_ok, format_explain_json, format_explain_text, format_plan_json,
    format_plan_text,
};
use crate::config::Settings;
use crate::emit::ActivationPlan;
use crate::error::LoadError;
use crate::fragment::ConfigFragment;
use crate::merge::EffectiveConfig;
use crate::module::ModuleRegistry;
use crate::pipeline::Pipeline;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Command name for logging (e.g. "resolve", "explain").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Resolve { .. } => "resolve",
        Commands::Explain { .. } => "explain",
        Commands::Check => "check",
        Commands::Fingerprint => "fingerprint",
    }
}

/// Runtime context for CLI execution: workspace, settings, and source overrides.
pub struct RunContext {
    workspace_root: PathBuf,
    settings: Settings,
    fragment: Option<PathBuf>,
    module_files: Vec<PathBuf>,
    include_env: bool,
}

impl RunContext {
    /// Create run context with already loaded settings.
    pub fn with_settings(cli: &Cli, settings: Settings) -> Self {
        Self {
            workspace_root: cli.workspace.clone(),
            settings,
            fragment: cli.fragment.clone(),
            module_files: cli.module_files.clone(),
            include_env: !cli.no_env,
        }
    }

    pub fn execute(&self, command: &Commands) -> Result<String, LoadError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, LoadError> {
        match command {
            Commands::Resolve { format } => {
                let plan = self.plan()?;
                match format {
                    OutputFormat::Text => Ok(format_plan_text(&plan)),
                    OutputFormat::Json => Ok(format_plan_json(&plan)?),
                }
            }
            Commands::Explain { key, format } => {
                let effective = self.effective()?;
                let value = effective
                    .get(key)
                    .ok_or_else(|| LoadError::UnsetKey(key.clone()))?;
                let origin = effective.origin_of(key);
                match format {
                    OutputFormat::Text => Ok(format_explain_text(key, value, origin)),
                    OutputFormat::Json => Ok(format_explain_json(key, value, origin)?),
                }
            }
            Commands::Check => self.plan().map(|plan| format_check_ok(&plan)),
            Commands::Fingerprint => Ok(self.effective()?.fingerprint()),
        }
    }

    fn registry(&self) -> Result<ModuleRegistry, LoadError> {
        let mut registry = self.settings.registry(&self.workspace_root)?;
        for file in &self.module_files {
            registry.load_file(file)?;
        }
        debug!(descriptors = registry.len(), "Module registry ready");
        Ok(registry)
    }

    fn fragments(&self) -> Result<Vec<ConfigFragment>, LoadError> {
        self.settings
            .fragments(&self.workspace_root, self.fragment.as_deref(), self.include_env)
    }

    fn plan(&self) -> Result<ActivationPlan, LoadError> {
        let registry = self.registry()?;
        let plan = Pipeline::run(&registry, self.settings.merge_policy(), self.fragments()?)?;
        Ok(plan)
    }

    /// Merge only; module defaults included, options not validated.
    fn effective(&self) -> Result<EffectiveConfig, LoadError> {
        let registry = self.registry()?;
        let mut pipeline = Pipeline::with_policy(&registry, self.settings.merge_policy());
        for fragment in self.fragments()? {
            pipeline.load(fragment)?;
        }
        pipeline.load_module_defaults()?;
        let effective = pipeline.merge()?.clone();
        Ok(effective)
    }
}
