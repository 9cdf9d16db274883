//! Module Descriptors and Registry
//!
//! A descriptor names a module, its ordering constraints relative to other
//! modules, its option schema, and the defaults it contributes.

use crate::error::LoadError;
use crate::fragment::ConfigFragment;
use crate::options::OptionSchema;
use crate::value::{Tree, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

mod resolver;

pub use resolver::ModuleResolver;

/// Registration shape of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    /// Key of the options subtree; defaults to the module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_key: Option<String>,
    /// Modules that must activate before this one.
    #[serde(default)]
    pub after: Vec<String>,
    /// Modules that must activate after this one.
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub schema: OptionSchema,
    /// Defaults for the options subtree, contributed as a module-default fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Tree>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_key: None,
            after: Vec::new(),
            before: Vec::new(),
            schema: OptionSchema::default(),
            defaults: None,
        }
    }

    pub fn with_config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    pub fn after(mut self, module: impl Into<String>) -> Self {
        self.after.push(module.into());
        self
    }

    pub fn before(mut self, module: impl Into<String>) -> Self {
        self.before.push(module.into());
        self
    }

    pub fn with_schema(mut self, schema: OptionSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_defaults(mut self, defaults: Tree) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn config_key(&self) -> &str {
        self.config_key.as_deref().unwrap_or(&self.name)
    }

    /// Module-default fragment carrying this module's defaults under its config key.
    pub fn default_fragment(&self) -> Option<ConfigFragment> {
        let defaults = self.defaults.as_ref()?;
        let mut tree = Tree::new();
        tree.insert(
            self.config_key().to_string(),
            Value::Tree(defaults.clone()),
        );
        Some(ConfigFragment::module_default(self.name.clone(), tree))
    }
}

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default, rename = "module")]
    modules: Vec<ModuleDescriptor>,
}

/// Descriptors by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    descriptors: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous descriptor with the same name.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Option<ModuleDescriptor> {
        let existing = self.index.get(&descriptor.name).copied();
        match existing {
            Some(slot) => Some(std::mem::replace(&mut self.descriptors[slot], descriptor)),
            None => {
                self.index
                    .insert(descriptor.name.clone(), self.descriptors.len());
                self.descriptors.push(descriptor);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.index.get(name).map(|&slot| &self.descriptors[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Module-default fragments for the enabled modules, in module-declaration order.
    /// Modules without a descriptor or without defaults contribute nothing.
    pub fn default_fragments(&self, modules: &[String]) -> Vec<ConfigFragment> {
        let mut seen = std::collections::HashSet::new();
        modules
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| self.get(name))
            .filter_map(ModuleDescriptor::default_fragment)
            .collect()
    }

    /// Register every `[[module]]` entry of a TOML descriptor file.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: DescriptorFile = toml::from_str(&source).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let count = file.modules.len();
        for descriptor in file.modules {
            if let Some(previous) = self.register(descriptor) {
                debug!(module = %previous.name, "Descriptor replaced");
            }
        }
        debug!(path = %path.display(), count, "Loaded module descriptors");
        Ok(count)
    }
}
