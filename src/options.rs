//! Module Option Schemas
//!
//! Declares the typed shape of a module's options subtree. Schemas are strict:
//! every recognized option is enumerated with its kind, whether it is required,
//! and its default.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod validator;

pub use validator::{OptionValidator, ValidatedModule};

/// Expected kind of an option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    Bool,
    Integer,
    /// Accepts integers and normalizes them to floats.
    Float,
    String,
    List(Box<OptionKind>),
    /// Arbitrary keys with values of one kind.
    Map(Box<OptionKind>),
    /// Fixed keys validated by a nested schema.
    Object(OptionSchema),
    OneOf(Vec<OptionKind>),
}

impl OptionKind {
    pub fn list(inner: OptionKind) -> Self {
        OptionKind::List(Box::new(inner))
    }

    pub fn map(inner: OptionKind) -> Self {
        OptionKind::Map(Box::new(inner))
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Bool => f.write_str("bool"),
            OptionKind::Integer => f.write_str("integer"),
            OptionKind::Float => f.write_str("float"),
            OptionKind::String => f.write_str("string"),
            OptionKind::List(inner) => write!(f, "list<{}>", inner),
            OptionKind::Map(inner) => write!(f, "map<{}>", inner),
            OptionKind::Object(_) => f.write_str("object"),
            OptionKind::OneOf(kinds) => {
                let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                write!(f, "one of {}", names.join(" | "))
            }
        }
    }
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub kind: OptionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Option name → spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSchema {
    options: BTreeMap<String, OptionSpec>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>, kind: OptionKind) -> Self {
        self.options.insert(
            name.into(),
            OptionSpec {
                kind,
                required: true,
                default: None,
            },
        );
        self
    }

    /// Optional option with no default; omitted from the normalized tree when absent.
    pub fn optional(mut self, name: impl Into<String>, kind: OptionKind) -> Self {
        self.options.insert(
            name.into(),
            OptionSpec {
                kind,
                required: false,
                default: None,
            },
        );
        self
    }

    pub fn with_default(
        mut self,
        name: impl Into<String>,
        kind: OptionKind,
        default: impl Into<Value>,
    ) -> Self {
        self.options.insert(
            name.into(),
            OptionSpec {
                kind,
                required: false,
                default: Some(default.into()),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionSpec)> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
