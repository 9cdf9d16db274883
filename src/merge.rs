//! Merge Engine
//!
//! Deep-merges fragments into one effective tree. Fragments are walked in
//! ascending priority (stable within a tier), and each key is combined by its
//! semantic kind:
//!
//! - scalar-override: the later value replaces the earlier one
//! - list-replace: a non-accumulating list replaces the earlier list wholesale
//! - list-accumulate: later items are appended unless already present (deep equality)
//! - nested-merge: trees recurse under the same rules
//!
//! A key whose kind differs between fragments fails with `SchemaConflict`.

use crate::error::PipelineError;
use crate::fragment::{ConfigFragment, Origin};
use crate::value::{KeyPath, Tree, Value};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace};

mod effective;

pub use effective::EffectiveConfig;

/// Semantic merge kind of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeKind {
    ScalarOverride,
    ListReplace,
    ListAccumulate,
    NestedMerge,
}

impl fmt::Display for MergeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeKind::ScalarOverride => "scalar-override",
            MergeKind::ListReplace => "list-replace",
            MergeKind::ListAccumulate => "list-accumulate",
            MergeKind::NestedMerge => "nested-merge",
        };
        f.write_str(name)
    }
}

/// Key paths whose lists accumulate across fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    accumulate: BTreeSet<KeyPath>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            accumulate: ["modules", "css", "vite.plugins", "build.transpile"]
                .into_iter()
                .map(KeyPath::parse)
                .collect(),
        }
    }
}

impl MergePolicy {
    /// Policy with no accumulating keys: every list replaces.
    pub fn empty() -> Self {
        Self {
            accumulate: BTreeSet::new(),
        }
    }

    pub fn with_accumulate(mut self, path: impl Into<KeyPath>) -> Self {
        self.accumulate.insert(path.into());
        self
    }

    pub fn is_accumulating(&self, path: &KeyPath) -> bool {
        self.accumulate.contains(path)
    }

    pub fn accumulating_keys(&self) -> impl Iterator<Item = &KeyPath> {
        self.accumulate.iter()
    }
}

/// Deterministic deep merge of configuration fragments.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    policy: MergePolicy,
}

impl MergeEngine {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Merge fragments into one effective configuration.
    ///
    /// Fragments are re-sorted by priority with a stable sort, so callers may
    /// pass them in any tier order; insertion order decides ties inside a tier.
    pub fn merge<'a, I>(&self, fragments: I) -> Result<EffectiveConfig, PipelineError>
    where
        I: IntoIterator<Item = &'a ConfigFragment>,
    {
        let mut ordered: Vec<&ConfigFragment> = fragments.into_iter().collect();
        ordered.sort_by_key(|f| f.priority());

        let mut accumulate = self.policy.accumulate.clone();
        for fragment in &ordered {
            accumulate.extend(fragment.accumulate().iter().cloned());
        }

        let mut ctx = MergeContext {
            accumulate: &accumulate,
            provenance: BTreeMap::new(),
        };
        let mut root = Tree::new();
        for fragment in &ordered {
            trace!(
                origin = %fragment.origin(),
                scope = fragment.scope().unwrap_or("-"),
                "Merging fragment"
            );
            merge_tree(
                &mut root,
                fragment.tree(),
                &KeyPath::root(),
                fragment.origin(),
                &mut ctx,
            )?;
        }

        debug!(
            fragments = ordered.len(),
            keys = root.len(),
            "Merged effective configuration"
        );
        Ok(EffectiveConfig::new(root, ctx.provenance))
    }
}

struct MergeContext<'a> {
    accumulate: &'a BTreeSet<KeyPath>,
    provenance: BTreeMap<KeyPath, Origin>,
}

impl MergeContext<'_> {
    fn kind_of(&self, value: &Value, path: &KeyPath) -> MergeKind {
        match value {
            Value::Scalar(_) => MergeKind::ScalarOverride,
            Value::List(_) if self.accumulate.contains(path) => MergeKind::ListAccumulate,
            Value::List(_) => MergeKind::ListReplace,
            Value::Tree(_) => MergeKind::NestedMerge,
        }
    }

    /// Record `origin` for `path` and every path beneath a freshly written value.
    fn record(&mut self, path: &KeyPath, value: &Value, origin: Origin) {
        self.provenance
            .retain(|existing, _| existing == path || !existing.starts_with(path));
        self.record_subtree(path, value, origin);
    }

    fn record_subtree(&mut self, path: &KeyPath, value: &Value, origin: Origin) {
        self.provenance.insert(path.clone(), origin);
        if let Value::Tree(tree) = value {
            for (key, child) in tree {
                self.record_subtree(&path.child(key), child, origin);
            }
        }
    }
}

fn merge_tree(
    target: &mut Tree,
    incoming: &Tree,
    prefix: &KeyPath,
    origin: Origin,
    ctx: &mut MergeContext<'_>,
) -> Result<(), PipelineError> {
    for (key, value) in incoming {
        let path = prefix.child(key);
        let incoming_kind = ctx.kind_of(value, &path);

        let existing = match target.entry(key.clone()) {
            Entry::Vacant(slot) => {
                // Fresh trees still walk every nested path so accumulating lists dedup.
                let fresh = match value {
                    Value::Tree(incoming_tree) => {
                        let mut subtree = Tree::new();
                        merge_tree(&mut subtree, incoming_tree, &path, origin, ctx)?;
                        Value::Tree(subtree)
                    }
                    Value::List(items) if incoming_kind == MergeKind::ListAccumulate => {
                        Value::List(dedup(items))
                    }
                    other => other.clone(),
                };
                ctx.record(&path, &fresh, origin);
                slot.insert(fresh);
                continue;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let existing_kind = ctx.kind_of(existing, &path);
        if existing_kind != incoming_kind {
            let first_origin = ctx.provenance.get(&path).copied().unwrap_or(origin);
            return Err(PipelineError::SchemaConflict {
                key: path.to_string(),
                first_origin,
                first_kind: existing_kind,
                second_origin: origin,
                second_kind: incoming_kind,
            });
        }

        match (existing, value) {
            (Value::Tree(existing_tree), Value::Tree(incoming_tree)) => {
                merge_tree(existing_tree, incoming_tree, &path, origin, ctx)?;
                ctx.provenance.insert(path, origin);
            }
            (Value::List(existing_items), Value::List(incoming_items))
                if incoming_kind == MergeKind::ListAccumulate =>
            {
                for item in incoming_items {
                    if !existing_items.contains(item) {
                        existing_items.push(item.clone());
                    }
                }
                ctx.provenance.insert(path, origin);
            }
            (slot, replacement) => {
                *slot = replacement.clone();
                ctx.record(&path, replacement, origin);
            }
        }
    }
    Ok(())
}

fn dedup(items: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
