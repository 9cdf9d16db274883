//! layerfold: Deterministic Configuration Composition
//!
//! Merges layered configuration fragments (framework defaults, module defaults,
//! user configuration, environment overrides) into one effective configuration,
//! orders the enabled modules by their declared constraints, validates each
//! module's options against its schema, and emits an activation plan.
//!
//! ```
//! use layerfold::fragment::{ConfigFragment, Origin};
//! use layerfold::merge::MergePolicy;
//! use layerfold::pipeline::Pipeline;
//! use layerfold::presets;
//! use layerfold::value::{Tree, Value};
//!
//! let mut user = Tree::new();
//! user.insert(
//!     "modules".to_string(),
//!     Value::List(vec![Value::from("@nuxt/icon")]),
//! );
//!
//! let registry = presets::registry();
//! let plan = Pipeline::run(
//!     &registry,
//!     MergePolicy::default(),
//!     vec![presets::framework_defaults(), ConfigFragment::new(Origin::User, user)],
//! )
//! .unwrap();
//! assert_eq!(plan.module_names(), vec!["@nuxt/icon"]);
//! ```

pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod fragment;
pub mod logging;
pub mod merge;
pub mod module;
pub mod options;
pub mod pipeline;
pub mod presets;
pub mod value;
