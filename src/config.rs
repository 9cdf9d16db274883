//! Tool Settings
//!
//! Settings for the `layerfold` tool itself: where fragments and descriptors come
//! from, which extra keys accumulate, and how to log. Layered with the `config`
//! crate: defaults, then the global file, then the workspace file, then
//! `LAYERFOLD_*` environment variables.
//!
//! These settings never enter the effective configuration; fragments do.

use crate::error::LoadError;
use crate::fragment::{
    environment_fragment_from_process, load_fragment_file, ConfigFragment, Origin,
    DEFAULT_ENV_PREFIX,
};
use crate::logging::LoggingConfig;
use crate::merge::MergePolicy;
use crate::module::ModuleRegistry;
use crate::presets;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod defaults;
mod facade;
mod sources;

pub use facade::SettingsLoader;
pub use sources::global_file::global_config_path;

/// Root settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub merge: MergeSettings,
}

/// Where fragments and module descriptors are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// User fragment, relative to the workspace root. Optional on disk.
    #[serde(default = "default_user_file")]
    pub user_file: PathBuf,

    /// Prefix of environment-override variables.
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,

    /// Extra TOML descriptor files, relative to the workspace root.
    #[serde(default)]
    pub module_files: Vec<PathBuf>,

    /// Register the built-in descriptors.
    #[serde(default = "default_true")]
    pub use_presets: bool,

    /// Load the built-in framework-default fragment.
    #[serde(default = "default_true")]
    pub framework_defaults: bool,
}

pub(crate) fn default_user_file() -> PathBuf {
    PathBuf::from("layerfold.config.toml")
}

fn default_env_prefix() -> String {
    DEFAULT_ENV_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_file: default_user_file(),
            env_prefix: default_env_prefix(),
            module_files: Vec::new(),
            use_presets: true,
            framework_defaults: true,
        }
    }
}

/// Merge engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Accumulating key paths in addition to the built-in ones.
    #[serde(default)]
    pub accumulate: Vec<String>,
}

/// Settings validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Logging(String),
    Sources(String),
    Merge(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
            ValidationError::Sources(msg) => write!(f, "Sources: {}", msg),
            ValidationError::Merge(msg) => write!(f, "Merge: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Settings {
    /// Validate the entire settings tree, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if self.sources.user_file.as_os_str().is_empty() {
            errors.push(ValidationError::Sources(
                "user_file cannot be empty".to_string(),
            ));
        }
        if self.sources.env_prefix.is_empty() {
            errors.push(ValidationError::Sources(
                "env_prefix cannot be empty".to_string(),
            ));
        }
        for key in &self.merge.accumulate {
            if key.is_empty() || key.split('.').any(str::is_empty) {
                errors.push(ValidationError::Merge(format!(
                    "invalid accumulate key '{}'",
                    key
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merge policy with the configured accumulating keys added.
    pub fn merge_policy(&self) -> MergePolicy {
        self.merge
            .accumulate
            .iter()
            .fold(MergePolicy::default(), |policy, key| {
                policy.with_accumulate(key.as_str())
            })
    }

    /// Built-in descriptors (when enabled) plus every configured descriptor file.
    pub fn registry(&self, workspace_root: &Path) -> Result<ModuleRegistry, LoadError> {
        let mut registry = if self.sources.use_presets {
            presets::registry()
        } else {
            ModuleRegistry::new()
        };
        for file in &self.sources.module_files {
            registry.load_file(&workspace_root.join(file))?;
        }
        Ok(registry)
    }

    /// Framework, user, and environment fragments for one invocation.
    ///
    /// `user_file` overrides the configured user fragment; a configured file
    /// that does not exist is skipped, an explicit one must exist.
    pub fn fragments(
        &self,
        workspace_root: &Path,
        user_file: Option<&Path>,
        include_env: bool,
    ) -> Result<Vec<ConfigFragment>, LoadError> {
        let mut fragments = Vec::new();
        if self.sources.framework_defaults {
            fragments.push(presets::framework_defaults());
        }

        match user_file {
            Some(path) => fragments.push(load_fragment_file(path, Origin::User)?),
            None => {
                let path = workspace_root.join(&self.sources.user_file);
                if path.exists() {
                    fragments.push(load_fragment_file(&path, Origin::User)?);
                } else {
                    debug!(path = %path.display(), "No user fragment");
                }
            }
        }

        if include_env {
            let fragment = environment_fragment_from_process(&self.sources.env_prefix)?;
            if !fragment.tree().is_empty() {
                fragments.push(fragment);
            }
        }
        Ok(fragments)
    }
}
