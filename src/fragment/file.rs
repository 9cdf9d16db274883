//! Fragment file source: TOML or JSON documents.

use super::{ConfigFragment, Origin};
use crate::error::LoadError;
use crate::value::{KeyPath, Tree, Value};
use std::path::Path;
use tracing::debug;

/// Reserved top-level key listing extra accumulating key paths. Stripped before merge.
pub const ACCUMULATE_KEY: &str = "$accumulate";

/// Supported fragment document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentFormat {
    Toml,
    Json,
}

impl FragmentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(FragmentFormat::Toml),
            Some("json") => Some(FragmentFormat::Json),
            _ => None,
        }
    }
}

/// Load a fragment file for the given origin.
pub fn load_fragment_file(path: &Path, origin: Origin) -> Result<ConfigFragment, LoadError> {
    let format =
        FragmentFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;
    let source = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let fragment = parse_fragment(&source, format, origin).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        path = %path.display(),
        origin = %origin,
        keys = fragment.tree().len(),
        "Loaded fragment file"
    );
    Ok(fragment)
}

/// Parse a fragment document.
pub fn parse_fragment(
    source: &str,
    format: FragmentFormat,
    origin: Origin,
) -> Result<ConfigFragment, String> {
    let mut tree: Tree = match format {
        FragmentFormat::Toml => toml::from_str(source).map_err(|e| e.to_string())?,
        FragmentFormat::Json => serde_json::from_str(source).map_err(|e| e.to_string())?,
    };

    let marks = match tree.remove(ACCUMULATE_KEY) {
        None => Vec::new(),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(KeyPath::parse).ok_or_else(|| {
                    format!("{} entries must be strings, got {}", ACCUMULATE_KEY, item.kind())
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(format!(
                "{} must be a list of key paths, got {}",
                ACCUMULATE_KEY,
                other.kind()
            ))
        }
    };

    let mut fragment = ConfigFragment::new(origin, tree);
    for path in marks {
        fragment = fragment.with_accumulate(path);
    }
    Ok(fragment)
}
