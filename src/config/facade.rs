//! Settings loading facade.

use super::defaults::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::Settings;
use crate::error::LoadError;
use config::{Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "LAYERFOLD";

/// Loads [`Settings`] for a workspace.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    workspace_root: PathBuf,
    global_file: Option<PathBuf>,
    use_environment: bool,
}

impl SettingsLoader {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            global_file: global_file::global_config_path(),
            use_environment: true,
        }
    }

    /// Read the global settings from `path` instead of the platform location.
    pub fn with_global_file(mut self, path: Option<PathBuf>) -> Self {
        self.global_file = path;
        self
    }

    pub fn without_environment(mut self) -> Self {
        self.use_environment = false;
        self
    }

    /// Defaults, then global file, then workspace file, then `LAYERFOLD_*` variables.
    pub fn load(&self) -> Result<Settings, LoadError> {
        let mut builder = builder_with_defaults()?;
        builder = global_file::add_to_builder(builder, self.global_file.as_deref())?;
        builder = workspace_file::add_to_builder(builder, &self.workspace_root)?;
        if self.use_environment {
            builder = builder.add_source(environment());
        }
        let settings = finish(builder)?;
        debug!(workspace = %self.workspace_root.display(), "Loaded settings");
        Ok(settings)
    }

    /// Defaults, then the given file only. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<Settings, LoadError> {
        if !path.exists() {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "settings file not found"),
            });
        }
        let builder = builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        finish(builder)
    }
}

/// `LAYERFOLD_LOGGING__LEVEL=debug` sets `logging.level`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Settings, LoadError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        LoadError::Config(messages.join("; "))
    })?;
    Ok(settings)
}
