//! Settings defaults applied before any file or environment source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a settings builder with defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("sources.user_file", "layerfold.config.toml")?
        .set_default("sources.use_presets", true)?
        .set_default("sources.framework_defaults", true)
}
