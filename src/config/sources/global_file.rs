//! Global settings file: `$XDG_CONFIG_HOME/layerfold/config.toml` on Linux,
//! the platform config directory elsewhere.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global settings file, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "layerfold").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global settings file to the builder when it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = path else {
        return Ok(builder);
    };
    if !path.exists() {
        debug!(config_path = %path.display(), "No global settings file");
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false)))
}
