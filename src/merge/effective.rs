//! Effective configuration: the single merged tree for one build invocation.

use crate::error::PipelineError;
use crate::fragment::Origin;
use crate::value::{tree_get, KeyPath, Tree, Value};
use blake3::Hasher;
use serde::Serialize;
use std::collections::BTreeMap;

/// Key holding the enabled module list.
pub const MODULES_KEY: &str = "modules";

/// Immutable merged configuration with per-key provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    tree: Tree,
    #[serde(skip)]
    provenance: BTreeMap<KeyPath, Origin>,
}

impl EffectiveConfig {
    pub(crate) fn new(tree: Tree, provenance: BTreeMap<KeyPath, Origin>) -> Self {
        Self { tree, provenance }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Value at a dotted key path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_path(&KeyPath::parse(path))
    }

    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        tree_get(&self.tree, path)
    }

    /// Origin of the last fragment that wrote the key.
    pub fn origin_of(&self, path: &str) -> Option<Origin> {
        self.provenance.get(&KeyPath::parse(path)).copied()
    }

    pub fn provenance(&self) -> &BTreeMap<KeyPath, Origin> {
        &self.provenance
    }

    /// Enabled module names in declaration order. A missing list means no modules.
    pub fn modules(&self) -> Result<Vec<String>, PipelineError> {
        let Some(value) = self.tree.get(MODULES_KEY) else {
            return Ok(Vec::new());
        };
        let Some(items) = value.as_list() else {
            return Err(PipelineError::InvalidModuleList {
                index: 0,
                actual: value.kind(),
            });
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| PipelineError::InvalidModuleList {
                        index,
                        actual: item.kind(),
                    })
            })
            .collect()
    }

    /// Options subtree for a module's config key.
    pub fn options_for(&self, config_key: &str) -> Option<&Value> {
        self.tree.get(config_key)
    }

    /// Canonical JSON: keys sorted, no whitespace.
    pub fn to_canonical_json(&self) -> String {
        // Tree has string keys and no non-finite floats from parsed input, so this cannot fail.
        serde_json::to_string(&self.tree).unwrap_or_default()
    }

    /// BLAKE3 digest of the canonical JSON, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Hasher::new();
        hasher.update(b"layerfold-effective:");
        hasher.update(self.to_canonical_json().as_bytes());
        hex::encode(hasher.finalize().as_bytes())
    }
}
