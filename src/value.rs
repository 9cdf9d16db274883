//! Configuration Values
//!
//! The tagged value tree that fragments, the effective configuration, and
//! module options are built from. Trees are ordered maps so serialization
//! is byte-stable across runs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered key → value mapping.
pub type Tree = BTreeMap<String, Value>;

/// Leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A configuration value: scalar, ordered sequence, or nested tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Tree(Tree),
}

/// Concrete kind of a value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Integer,
    Float,
    String,
    List,
    Tree,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::Tree => "tree",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(Scalar::Bool(_)) => ValueKind::Bool,
            Value::Scalar(Scalar::Integer(_)) => ValueKind::Integer,
            Value::Scalar(Scalar::Float(_)) => ValueKind::Float,
            Value::Scalar(Scalar::String(_)) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Tree(_) => ValueKind::Tree,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Value::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Look up a nested value by key path. The empty path returns `self`.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        let mut current = self;
        for segment in path.segments() {
            current = current.as_tree()?.get(segment)?;
        }
        Some(current)
    }

    /// Convert a JSON document into a value. JSON `null` has no counterpart and is rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Value, serde_json::Error> {
        serde_json::from_value(json)
    }
}

/// Look up a nested value inside a tree by key path.
pub fn tree_get<'a>(tree: &'a Tree, path: &KeyPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = tree.get(first)?;
    for segment in rest {
        current = current.as_tree()?.get(segment)?;
    }
    Some(current)
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Integer(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::String(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        Value::Tree(tree)
    }
}

/// Dotted key path into a tree (`googleFonts.families`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    /// Parse a dotted path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        KeyPath(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyPath(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        KeyPath::parse(path)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(KeyPath::parse(&raw))
    }
}
