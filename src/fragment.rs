//! Configuration Fragments
//!
//! One origin's contribution to the configuration, pre-merge. Fragments are
//! immutable once constructed; the store only ever hands out shared references.

use crate::value::{KeyPath, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

mod env;
mod file;
mod store;

pub use env::{
    environment_fragment, environment_fragment_from_os, environment_fragment_from_process,
    DEFAULT_ENV_PREFIX,
};
pub use file::{load_fragment_file, parse_fragment, FragmentFormat, ACCUMULATE_KEY};
pub use store::FragmentStore;

/// Where a fragment came from. Declaration order is priority order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    FrameworkDefault,
    ModuleDefault,
    User,
    Environment,
}

impl Origin {
    /// Priority rank: framework-default < module-default < user < environment.
    pub fn rank(self) -> u8 {
        match self {
            Origin::FrameworkDefault => 0,
            Origin::ModuleDefault => 1,
            Origin::User => 2,
            Origin::Environment => 3,
        }
    }

    /// Singular origins admit exactly one fragment per invocation.
    pub fn is_singular(self) -> bool {
        !matches!(self, Origin::ModuleDefault)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::FrameworkDefault => "framework-default",
            Origin::ModuleDefault => "module-default",
            Origin::User => "user",
            Origin::Environment => "environment",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "framework-default" => Ok(Origin::FrameworkDefault),
            "module-default" => Ok(Origin::ModuleDefault),
            "user" => Ok(Origin::User),
            "environment" => Ok(Origin::Environment),
            other => Err(format!("Unknown origin: {}", other)),
        }
    }
}

/// An origin-tagged configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFragment {
    origin: Origin,
    scope: Option<String>,
    tree: Tree,
    accumulate: BTreeSet<KeyPath>,
}

impl ConfigFragment {
    pub fn new(origin: Origin, tree: Tree) -> Self {
        Self {
            origin,
            scope: None,
            tree,
            accumulate: BTreeSet::new(),
        }
    }

    /// Module-default fragment scoped to the module that contributed it.
    pub fn module_default(module: impl Into<String>, tree: Tree) -> Self {
        Self::new(Origin::ModuleDefault, tree).with_scope(module)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Mark a key path as list-accumulating for the whole merge.
    pub fn with_accumulate(mut self, path: impl Into<KeyPath>) -> Self {
        self.accumulate.insert(path.into());
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn priority(&self) -> u8 {
        self.origin.rank()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn accumulate(&self) -> &BTreeSet<KeyPath> {
        &self.accumulate
    }
}
