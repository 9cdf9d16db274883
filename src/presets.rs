//! Built-in Descriptors
//!
//! Framework defaults and descriptors for the modules shipped with the tool:
//! `@nuxtjs/google-fonts` and `@nuxt/icon`.

use crate::fragment::{ConfigFragment, Origin};
use crate::module::{ModuleDescriptor, ModuleRegistry};
use crate::options::{OptionKind, OptionSchema};
use crate::value::{Tree, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GOOGLE_FONTS: &str = "@nuxtjs/google-fonts";
pub const ICON: &str = "@nuxt/icon";

/// Compatibility date applied when the user does not pin one.
pub const DEFAULT_COMPATIBILITY_DATE: &str = "2024-11-01";

/// Framework-default fragment, the lowest-priority layer.
pub fn framework_defaults() -> ConfigFragment {
    let mut devtools = Tree::new();
    devtools.insert("enabled".to_string(), Value::from(false));

    let mut vite = Tree::new();
    vite.insert("plugins".to_string(), Value::List(Vec::new()));

    let mut build = Tree::new();
    build.insert("transpile".to_string(), Value::List(Vec::new()));

    let mut tree = Tree::new();
    tree.insert(
        "compatibilityDate".to_string(),
        Value::from(DEFAULT_COMPATIBILITY_DATE),
    );
    tree.insert("devtools".to_string(), Value::Tree(devtools));
    tree.insert("css".to_string(), Value::List(Vec::new()));
    tree.insert("modules".to_string(), Value::List(Vec::new()));
    tree.insert("vite".to_string(), Value::Tree(vite));
    tree.insert("build".to_string(), Value::Tree(build));
    tree.insert("ssr".to_string(), Value::from(true));

    ConfigFragment::new(Origin::FrameworkDefault, tree)
}

/// `@nuxtjs/google-fonts`, options under `googleFonts`.
pub fn google_fonts() -> ModuleDescriptor {
    let weights = OptionKind::list(OptionKind::Integer);
    let axis = OptionKind::OneOf(vec![OptionKind::Bool, OptionKind::String, weights.clone()]);
    let family = OptionKind::OneOf(vec![OptionKind::Bool, weights, OptionKind::map(axis)]);

    let schema = OptionSchema::new()
        .optional("families", OptionKind::map(family))
        .optional("display", OptionKind::String)
        .with_default(
            "subsets",
            OptionKind::list(OptionKind::String),
            Value::List(Vec::new()),
        )
        .optional("text", OptionKind::String)
        .with_default("prefetch", OptionKind::Bool, true)
        .with_default("preconnect", OptionKind::Bool, true)
        .with_default("preload", OptionKind::Bool, false)
        .with_default("useStylesheet", OptionKind::Bool, false)
        .with_default("download", OptionKind::Bool, true)
        .with_default("base64", OptionKind::Bool, false)
        .with_default("inject", OptionKind::Bool, true)
        .with_default("overwriting", OptionKind::Bool, false)
        .with_default("outputDir", OptionKind::String, "assets")
        .with_default("stylePath", OptionKind::String, "css/fonts.css")
        .with_default("fontsDir", OptionKind::String, "fonts");

    let mut defaults = Tree::new();
    defaults.insert("families".to_string(), Value::Tree(Tree::new()));
    defaults.insert("display".to_string(), Value::from("swap"));

    ModuleDescriptor::new(GOOGLE_FONTS)
        .with_config_key("googleFonts")
        .with_schema(schema)
        .with_defaults(defaults)
}

/// `@nuxt/icon`, options under `icon`.
pub fn icon() -> ModuleDescriptor {
    let schema = OptionSchema::new()
        .optional("size", OptionKind::String)
        .with_default("class", OptionKind::String, "")
        .optional("mode", OptionKind::String)
        .with_default(
            "aliases",
            OptionKind::map(OptionKind::String),
            Value::Tree(Tree::new()),
        )
        .with_default("componentName", OptionKind::String, "Icon")
        .optional("cssLayer", OptionKind::String);

    let mut defaults = Tree::new();
    defaults.insert("mode".to_string(), Value::from("css"));

    ModuleDescriptor::new(ICON)
        .with_config_key("icon")
        .with_schema(schema)
        .with_defaults(defaults)
}

/// Registry holding every built-in descriptor.
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(google_fonts());
    registry.register(icon());
    registry
}

/// Validated `googleFonts` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFontsOptions {
    #[serde(default)]
    pub families: BTreeMap<String, FamilySelection>,
    pub display: Option<String>,
    #[serde(default)]
    pub subsets: Vec<String>,
    pub text: Option<String>,
    pub prefetch: bool,
    pub preconnect: bool,
    pub preload: bool,
    pub use_stylesheet: bool,
    pub download: bool,
    pub base64: bool,
    pub inject: bool,
    pub overwriting: bool,
    pub output_dir: String,
    pub style_path: String,
    pub fonts_dir: String,
}

/// Per-family selection: enable, list weights, or pick axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FamilySelection {
    Enabled(bool),
    Weights(Vec<i64>),
    Axes(BTreeMap<String, AxisSelection>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSelection {
    Enabled(bool),
    Range(String),
    Weights(Vec<i64>),
}

/// Validated `icon` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconOptions {
    pub size: Option<String>,
    pub class: String,
    pub mode: Option<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    pub component_name: String,
    pub css_layer: Option<String>,
}
