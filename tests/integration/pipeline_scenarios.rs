//! End-to-end pipeline scenarios over hand-built fragments and descriptors

use super::test_utils::{fragment, names, tree};
use layerfold::error::PipelineError;
use layerfold::fragment::{ConfigFragment, Origin};
use layerfold::merge::{MergeKind, MergePolicy};
use layerfold::module::{ModuleDescriptor, ModuleRegistry};
use layerfold::options::{OptionKind, OptionSchema};
use layerfold::pipeline::{Pipeline, PipelineState};
use layerfold::value::{Value, ValueKind};
use serde_json::json;

fn registry(descriptors: Vec<ModuleDescriptor>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for descriptor in descriptors {
        registry.register(descriptor);
    }
    registry
}

fn two_layer_modules() -> Vec<ConfigFragment> {
    vec![
        fragment(Origin::FrameworkDefault, json!({ "modules": ["A"] })),
        fragment(Origin::User, json!({ "modules": ["B"] })).with_accumulate("modules"),
    ]
}

#[test]
fn test_accumulated_module_list_with_after_constraint() {
    let registry = registry(vec![
        ModuleDescriptor::new("A"),
        ModuleDescriptor::new("B").after("A"),
    ]);
    let plan = Pipeline::run(&registry, MergePolicy::empty(), two_layer_modules()).unwrap();
    assert_eq!(plan.module_names(), vec!["A", "B"]);
}

#[test]
fn test_before_constraint_reorders_modules() {
    let registry = registry(vec![
        ModuleDescriptor::new("A"),
        ModuleDescriptor::new("B").before("A"),
    ]);
    let plan = Pipeline::run(&registry, MergePolicy::empty(), two_layer_modules()).unwrap();
    assert_eq!(plan.module_names(), vec!["B", "A"]);
}

#[test]
fn test_agreeing_before_and_after_constraints_resolve() {
    let registry = registry(vec![
        ModuleDescriptor::new("A").after("B"),
        ModuleDescriptor::new("B").before("A"),
    ]);
    let plan = Pipeline::run(&registry, MergePolicy::empty(), two_layer_modules()).unwrap();
    assert_eq!(plan.module_names(), vec!["B", "A"]);
}

#[test]
fn test_contradicting_constraints_fail_with_cycle() {
    let registry = registry(vec![
        ModuleDescriptor::new("A").after("B"),
        ModuleDescriptor::new("B").after("A"),
    ]);
    let err = Pipeline::run(&registry, MergePolicy::empty(), two_layer_modules()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::ModuleCycle {
            cycle: names(&["A", "B"])
        }
    );
}

#[test]
fn test_environment_overrides_user_scalar() {
    let registry = ModuleRegistry::new();
    let mut pipeline = Pipeline::new(&registry);
    pipeline
        .load(fragment(Origin::Environment, json!({ "ssr": false })))
        .unwrap();
    pipeline
        .load(fragment(Origin::User, json!({ "ssr": true, "app": { "baseURL": "/" } })))
        .unwrap();
    let effective = pipeline.merge().unwrap();
    assert_eq!(effective.get("ssr"), Some(&Value::from(false)));
    assert_eq!(effective.origin_of("ssr"), Some(Origin::Environment));
    assert_eq!(effective.get("app.baseURL"), Some(&Value::from("/")));
}

#[test]
fn test_list_and_scalar_for_same_key_conflict() {
    let registry = ModuleRegistry::new();
    let fragments = vec![
        fragment(Origin::FrameworkDefault, json!({ "css": [] })),
        fragment(Origin::User, json!({ "css": "~/main.css" })),
    ];
    let err = Pipeline::run(&registry, MergePolicy::default(), fragments).unwrap_err();
    assert_eq!(
        err,
        PipelineError::SchemaConflict {
            key: "css".to_string(),
            first_origin: Origin::FrameworkDefault,
            first_kind: MergeKind::ListAccumulate,
            second_origin: Origin::User,
            second_kind: MergeKind::ScalarOverride,
        }
    );
}

#[test]
fn test_second_user_fragment_is_rejected() {
    let registry = ModuleRegistry::new();
    let fragments = vec![
        fragment(Origin::User, json!({ "ssr": true })),
        fragment(Origin::User, json!({ "ssr": false })),
    ];
    let err = Pipeline::run(&registry, MergePolicy::default(), fragments).unwrap_err();
    assert_eq!(
        err,
        PipelineError::DuplicateOrigin {
            origin: Origin::User,
            scope: None,
        }
    );
}

#[test]
fn test_module_list_must_hold_names() {
    let registry = ModuleRegistry::new();
    let fragments = vec![fragment(Origin::User, json!({ "modules": ["A", 7] }))];
    let err = Pipeline::run(&registry, MergePolicy::default(), fragments).unwrap_err();
    assert_eq!(
        err,
        PipelineError::InvalidModuleList {
            index: 1,
            actual: ValueKind::Integer,
        }
    );
}

#[test]
fn test_validation_follows_resolution_order() {
    // Both modules are invalid; the error names whichever activates first.
    let schema = OptionSchema::new().required("id", OptionKind::String);
    let registry = registry(vec![
        ModuleDescriptor::new("first").with_schema(schema.clone()),
        ModuleDescriptor::new("second")
            .with_schema(schema)
            .before("first"),
    ]);
    let fragments = vec![fragment(Origin::User, json!({ "modules": ["first", "second"] }))];
    let err = Pipeline::run(&registry, MergePolicy::default(), fragments).unwrap_err();
    assert_eq!(
        err,
        PipelineError::MissingOption {
            module: "second".to_string(),
            option: "id".to_string(),
        }
    );
}

#[test]
fn test_module_defaults_rank_below_user_options() {
    let schema = OptionSchema::new()
        .optional("size", OptionKind::String)
        .optional("mode", OptionKind::String);
    let registry = registry(vec![ModuleDescriptor::new("icons")
        .with_schema(schema)
        .with_defaults(tree(json!({ "size": "1em", "mode": "css" })))]);
    let fragments = vec![fragment(
        Origin::User,
        json!({ "modules": ["icons"], "icons": { "mode": "svg" } }),
    )];
    let plan = Pipeline::run(&registry, MergePolicy::default(), fragments).unwrap();
    let options = plan.records()[0].options();
    assert_eq!(options["size"], Value::from("1em"));
    assert_eq!(options["mode"], Value::from("svg"));
}

#[test]
fn test_module_default_fragments_tie_break_by_insertion() {
    let registry = ModuleRegistry::new();
    let mut pipeline = Pipeline::new(&registry);
    pipeline
        .load(ConfigFragment::module_default("a", tree(json!({ "shared": 1 }))))
        .unwrap();
    pipeline
        .load(ConfigFragment::module_default("b", tree(json!({ "shared": 2 }))))
        .unwrap();
    let effective = pipeline.merge().unwrap();
    assert_eq!(effective.get("shared"), Some(&Value::from(2)));
}

#[test]
fn test_failed_pipeline_emits_nothing() {
    let registry = registry(vec![ModuleDescriptor::new("A")]);
    let mut pipeline = Pipeline::new(&registry);
    pipeline
        .load(fragment(Origin::User, json!({ "modules": ["A", "ghost"] })))
        .unwrap();
    pipeline.merge().unwrap();
    assert!(pipeline.resolve().is_err());
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(matches!(
        pipeline.emit(),
        Err(PipelineError::InvalidTransition {
            from: PipelineState::Failed,
            ..
        })
    ));
}
