//! Option Validator
//!
//! Checks a module's options subtree against its schema and produces a new,
//! normalized tree: defaults filled, integers widened where floats are
//! expected. Pure; the effective configuration is never mutated.

use super::{OptionKind, OptionSchema};
use crate::error::PipelineError;
use crate::merge::EffectiveConfig;
use crate::module::ModuleDescriptor;
use crate::value::{KeyPath, Scalar, Tree, Value};
use tracing::debug;

/// A module whose options passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedModule {
    pub name: String,
    pub config_key: String,
    pub options: Tree,
}

/// Strict schema validation for module options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionValidator;

impl OptionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the options subtree keyed by the module's config key.
    pub fn validate_module(
        &self,
        descriptor: &ModuleDescriptor,
        effective: &EffectiveConfig,
    ) -> Result<ValidatedModule, PipelineError> {
        let options = self.validate(descriptor, effective.options_for(descriptor.config_key()))?;
        debug!(
            module = %descriptor.name,
            options = options.len(),
            "Validated module options"
        );
        Ok(ValidatedModule {
            name: descriptor.name.clone(),
            config_key: descriptor.config_key().to_string(),
            options,
        })
    }

    /// Validate a raw options value. `None` is treated as an empty subtree.
    pub fn validate(
        &self,
        descriptor: &ModuleDescriptor,
        options: Option<&Value>,
    ) -> Result<Tree, PipelineError> {
        let check = Check {
            module: &descriptor.name,
        };
        let empty = Tree::new();
        let tree = match options {
            None => &empty,
            Some(Value::Tree(tree)) => tree,
            Some(other) => {
                return Err(PipelineError::OptionType {
                    module: descriptor.name.clone(),
                    option: descriptor.config_key().to_string(),
                    expected: "object".to_string(),
                    actual: other.kind(),
                })
            }
        };
        check.object(&descriptor.schema, tree, &KeyPath::root())
    }
}

struct Check<'a> {
    module: &'a str,
}

impl Check<'_> {
    fn object(
        &self,
        schema: &OptionSchema,
        tree: &Tree,
        prefix: &KeyPath,
    ) -> Result<Tree, PipelineError> {
        if let Some(unknown) = tree.keys().find(|key| !schema.contains(key)) {
            return Err(PipelineError::UnknownOption {
                module: self.module.to_string(),
                option: prefix.child(unknown).to_string(),
            });
        }

        let mut normalized = Tree::new();
        for (name, spec) in schema.iter() {
            let path = prefix.child(name);
            match tree.get(name) {
                Some(value) => {
                    normalized.insert(name.clone(), self.value(&spec.kind, value, &path)?);
                }
                None => {
                    if let Some(default) = &spec.default {
                        normalized.insert(name.clone(), self.value(&spec.kind, default, &path)?);
                    } else if spec.required {
                        return Err(PipelineError::MissingOption {
                            module: self.module.to_string(),
                            option: path.to_string(),
                        });
                    }
                }
            }
        }
        Ok(normalized)
    }

    fn value(&self, kind: &OptionKind, value: &Value, path: &KeyPath) -> Result<Value, PipelineError> {
        match (kind, value) {
            (OptionKind::Bool, Value::Scalar(Scalar::Bool(_)))
            | (OptionKind::Integer, Value::Scalar(Scalar::Integer(_)))
            | (OptionKind::Float, Value::Scalar(Scalar::Float(_)))
            | (OptionKind::String, Value::Scalar(Scalar::String(_))) => Ok(value.clone()),
            (OptionKind::Float, Value::Scalar(Scalar::Integer(i))) => Ok(Value::from(*i as f64)),
            (OptionKind::List(inner), Value::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.value(inner, item, &path.child(&i.to_string())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (OptionKind::Map(inner), Value::Tree(entries)) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.value(inner, item, &path.child(key))?)))
                .collect::<Result<Tree, PipelineError>>()
                .map(Value::Tree),
            (OptionKind::Object(schema), Value::Tree(tree)) => {
                self.object(schema, tree, path).map(Value::Tree)
            }
            (OptionKind::OneOf(kinds), _) => self.one_of(kinds, value, path),
            _ => Err(self.mismatch(kind, value, path)),
        }
    }

    /// A single shape-compatible alternative reports its own error, so strictness
    /// inside nested objects is not hidden behind a generic mismatch.
    fn one_of(
        &self,
        kinds: &[OptionKind],
        value: &Value,
        path: &KeyPath,
    ) -> Result<Value, PipelineError> {
        let candidates: Vec<&OptionKind> = kinds
            .iter()
            .filter(|kind| shape_matches(kind, value))
            .collect();

        let mut first_error = None;
        for kind in &candidates {
            match self.value(kind, value, path) {
                Ok(normalized) => return Ok(normalized),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match (candidates.len(), first_error) {
            (1, Some(err)) => Err(err),
            _ => Err(self.mismatch(&OptionKind::OneOf(kinds.to_vec()), value, path)),
        }
    }

    fn mismatch(&self, kind: &OptionKind, value: &Value, path: &KeyPath) -> PipelineError {
        PipelineError::OptionType {
            module: self.module.to_string(),
            option: path.to_string(),
            expected: kind.to_string(),
            actual: value.kind(),
        }
    }
}

fn shape_matches(kind: &OptionKind, value: &Value) -> bool {
    match (kind, value) {
        (OptionKind::Bool, Value::Scalar(Scalar::Bool(_))) => true,
        (OptionKind::Integer, Value::Scalar(Scalar::Integer(_))) => true,
        (OptionKind::Float, Value::Scalar(Scalar::Integer(_) | Scalar::Float(_))) => true,
        (OptionKind::String, Value::Scalar(Scalar::String(_))) => true,
        (OptionKind::List(_), Value::List(_)) => true,
        (OptionKind::Map(_) | OptionKind::Object(_), Value::Tree(_)) => true,
        (OptionKind::OneOf(kinds), _) => kinds.iter().any(|k| shape_matches(k, value)),
        _ => false,
    }
}
