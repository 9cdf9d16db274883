//! Pipeline Emitter
//!
//! Zips the resolved order with validated options into activation records,
//! the only output the build host consumes.

use crate::options::ValidatedModule;
use crate::value::Tree;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One module to activate, with its validated options and position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationRecord {
    module: String,
    config_key: String,
    position: usize,
    options: Tree,
}

impl ActivationRecord {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn config_key(&self) -> &str {
        &self.config_key
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn options(&self) -> &Tree {
        &self.options
    }

    /// Deserialize the validated options into a typed options struct.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(&self.options)?)
    }
}

/// Ordered activation records plus the fingerprint of the configuration they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationPlan {
    fingerprint: String,
    records: Vec<ActivationRecord>,
}

impl ActivationPlan {
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn records(&self) -> &[ActivationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ActivationRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.records.iter().map(ActivationRecord::module).collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the activation plan. `validated` is already in resolution order.
pub fn emit(fingerprint: String, validated: Vec<ValidatedModule>) -> ActivationPlan {
    let records = validated
        .into_iter()
        .enumerate()
        .map(|(position, module)| ActivationRecord {
            module: module.name,
            config_key: module.config_key,
            position,
            options: module.options,
        })
        .collect();
    ActivationPlan {
        fingerprint,
        records,
    }
}
