//! Environment fragment source.
//!
//! `LAYERFOLD_CONFIG__DEVTOOLS__ENABLED=true` becomes `devtools.enabled = true`.
//! Segments are separated by `__` and converted from SCREAMING_SNAKE to lowerCamelCase.

use super::{ConfigFragment, Origin};
use crate::error::LoadError;
use crate::value::{Tree, Value};
use std::collections::BTreeMap;
use std::ffi::OsString;
use tracing::debug;

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "LAYERFOLD_CONFIG__";

const SEPARATOR: &str = "__";

/// Build the environment fragment from the current process environment.
pub fn environment_fragment_from_process(prefix: &str) -> Result<ConfigFragment, LoadError> {
    environment_fragment_from_os(std::env::vars_os(), prefix)
}

/// Build the environment fragment from raw OS variables.
///
/// Unprefixed variables are skipped even when they are not UTF-8. A prefixed
/// variable whose key or value is not UTF-8 fails with `LoadError::Environment`.
pub fn environment_fragment_from_os<I>(vars: I, prefix: &str) -> Result<ConfigFragment, LoadError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut utf8 = Vec::new();
    for (key, value) in vars {
        let lossy_key = key.to_string_lossy().into_owned();
        if !lossy_key.starts_with(prefix) {
            continue;
        }
        let key = key.into_string().map_err(|_| LoadError::Environment {
            key: lossy_key.clone(),
            message: "variable name is not valid UTF-8".to_string(),
        })?;
        let value = value.into_string().map_err(|_| LoadError::Environment {
            key: lossy_key,
            message: "value is not valid UTF-8".to_string(),
        })?;
        utf8.push((key, value));
    }
    environment_fragment(utf8, prefix)
}

/// Build the environment fragment from explicit variables. Variables without the prefix are ignored.
pub fn environment_fragment<I>(vars: I, prefix: &str) -> Result<ConfigFragment, LoadError>
where
    I: IntoIterator<Item = (String, String)>,
{
    // Sorted so nested insertion is independent of process environment order.
    let matching: BTreeMap<String, String> = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(prefix) && key.len() > prefix.len())
        .collect();

    let mut tree = Tree::new();
    for (key, raw) in &matching {
        let segments = key[prefix.len()..]
            .split(SEPARATOR)
            .map(|segment| {
                if segment.is_empty() {
                    Err(LoadError::Environment {
                        key: key.clone(),
                        message: "empty path segment".to_string(),
                    })
                } else {
                    Ok(to_lower_camel(segment))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let value = coerce(raw).map_err(|message| LoadError::Environment {
            key: key.clone(),
            message,
        })?;
        insert_path(&mut tree, &segments, value).map_err(|message| LoadError::Environment {
            key: key.clone(),
            message,
        })?;
    }

    debug!(prefix, overrides = matching.len(), "Built environment fragment");
    Ok(ConfigFragment::new(Origin::Environment, tree))
}

fn to_lower_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
        let lower = word.to_ascii_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.extend(chars);
            }
        }
    }
    out
}

fn coerce(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Ok(Value::from(true)),
        "false" => return Ok(Value::from(false)),
        _ => {}
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return serde_json::from_str::<Value>(trimmed).map_err(|e| format!("invalid JSON: {}", e));
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if looks_numeric(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return Ok(Value::from(f));
        }
    }
    Ok(Value::from(raw))
}

fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

fn insert_path(tree: &mut Tree, segments: &[String], value: Value) -> Result<(), String> {
    let Some((last, parents)) = segments.split_last() else {
        return Err("empty key".to_string());
    };
    let mut current = tree;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Tree(Tree::new()));
        current = match entry {
            Value::Tree(child) => child,
            other => {
                return Err(format!(
                    "'{}' is already set to a {}, cannot nest under it",
                    segment,
                    other.kind()
                ))
            }
        };
    }
    if current.contains_key(last) {
        return Err(format!("'{}' is set more than once", last));
    }
    current.insert(last.clone(), value);
    Ok(())
}
