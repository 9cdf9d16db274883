//! Shared test utilities for integration tests

use layerfold::fragment::{ConfigFragment, Origin};
use layerfold::value::{Tree, Value};
use std::sync::Mutex;

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Build a fragment from a JSON object literal.
pub fn fragment(origin: Origin, doc: serde_json::Value) -> ConfigFragment {
    ConfigFragment::new(origin, tree(doc))
}

pub fn tree(doc: serde_json::Value) -> Tree {
    match Value::from_json(doc).unwrap() {
        Value::Tree(tree) => tree,
        other => panic!("expected a JSON object, got {}", other.kind()),
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Run `test` with the given variables set, restoring previous values afterwards.
pub fn with_env_vars<F, R>(vars: &[(&str, &str)], test: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test));

    for (key, previous) in saved {
        match previous {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }
    }
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
