//! Workspace settings: `layerfold.toml`, then `layerfold.{LAYERFOLD_ENV}.toml`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

pub const WORKSPACE_FILE: &str = "layerfold.toml";

/// Add workspace settings files to the builder.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let base = workspace_root.join(WORKSPACE_FILE);
    if base.exists() {
        builder = builder.add_source(File::from(base).format(FileFormat::Toml).required(false));
    }

    if let Ok(env_name) = std::env::var("LAYERFOLD_ENV") {
        let env_specific = workspace_root.join(format!("layerfold.{}.toml", env_name));
        if env_specific.exists() {
            builder = builder
                .add_source(File::from(env_specific).format(FileFormat::Toml).required(false));
        }
    }

    Ok(builder)
}
