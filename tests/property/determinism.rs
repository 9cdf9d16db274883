//! Merge determinism, precedence, and accumulation properties

use layerfold::fragment::{ConfigFragment, Origin};
use layerfold::merge::{MergeEngine, MergePolicy};
use layerfold::value::{Tree, Value};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

/// Flat scalar maps over a small key space so fragments overlap.
fn flat_tree() -> impl Strategy<Value = Tree> {
    prop::collection::btree_map("k[0-5]", scalar(), 0..6)
}

fn module_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec("[a-d]".prop_map(Value::from), 0..6)
}

fn with_modules(mut tree: Tree, modules: Vec<Value>) -> Tree {
    tree.insert("modules".to_string(), Value::List(modules));
    tree
}

proptest! {
    #[test]
    fn prop_merge_is_deterministic(
        framework in flat_tree(),
        user in flat_tree(),
        env in flat_tree(),
    ) {
        let fragments = vec![
            ConfigFragment::new(Origin::FrameworkDefault, framework),
            ConfigFragment::new(Origin::User, user),
            ConfigFragment::new(Origin::Environment, env),
        ];
        let engine = MergeEngine::new(MergePolicy::default());
        let first = engine.merge(fragments.iter()).unwrap();
        let second = engine.merge(fragments.iter()).unwrap();
        prop_assert_eq!(first.to_canonical_json(), second.to_canonical_json());
        prop_assert_eq!(first.fingerprint(), second.fingerprint());

        // Tier order is recovered from origins, not argument order.
        let reversed = engine.merge(fragments.iter().rev()).unwrap();
        prop_assert_eq!(first.fingerprint(), reversed.fingerprint());
    }

    #[test]
    fn prop_higher_priority_scalar_wins(
        framework in flat_tree(),
        user in flat_tree(),
    ) {
        let fragments = vec![
            ConfigFragment::new(Origin::FrameworkDefault, framework.clone()),
            ConfigFragment::new(Origin::User, user.clone()),
        ];
        let effective = MergeEngine::new(MergePolicy::default())
            .merge(fragments.iter())
            .unwrap();

        let mut expected: BTreeMap<&String, &Value> = framework.iter().collect();
        expected.extend(user.iter());
        for (key, value) in expected {
            prop_assert_eq!(effective.get(key), Some(value));
            let origin = if user.contains_key(key) {
                Origin::User
            } else {
                Origin::FrameworkDefault
            };
            prop_assert_eq!(effective.origin_of(key), Some(origin));
        }
    }

    #[test]
    fn prop_accumulating_lists_concatenate_without_duplicates(
        lower in module_list(),
        higher in module_list(),
    ) {
        let fragments = vec![
            ConfigFragment::new(Origin::User, with_modules(Tree::new(), higher.clone())),
            ConfigFragment::new(Origin::FrameworkDefault, with_modules(Tree::new(), lower.clone())),
        ];
        let effective = MergeEngine::new(MergePolicy::default())
            .merge(fragments.iter())
            .unwrap();

        let mut expected: Vec<Value> = Vec::new();
        for item in lower.iter().chain(higher.iter()) {
            if !expected.contains(item) {
                expected.push(item.clone());
            }
        }
        prop_assert_eq!(effective.get("modules"), Some(&Value::List(expected)));
    }

    #[test]
    fn prop_nested_accumulating_list_dedups_in_single_fragment(
        plugins in module_list(),
        lower_defines_parent in any::<bool>(),
    ) {
        let mut vite = Tree::new();
        vite.insert("plugins".to_string(), Value::List(plugins.clone()));
        let mut user = Tree::new();
        user.insert("vite".to_string(), Value::Tree(vite));

        let mut fragments = vec![ConfigFragment::new(Origin::User, user)];
        if lower_defines_parent {
            let mut framework = Tree::new();
            framework.insert("vite".to_string(), Value::Tree(Tree::new()));
            fragments.push(ConfigFragment::new(Origin::FrameworkDefault, framework));
        }
        let effective = MergeEngine::new(MergePolicy::default())
            .merge(fragments.iter())
            .unwrap();

        let mut expected: Vec<Value> = Vec::new();
        for item in &plugins {
            if !expected.contains(item) {
                expected.push(item.clone());
            }
        }
        prop_assert_eq!(effective.get("vite.plugins"), Some(&Value::List(expected)));
    }
}
