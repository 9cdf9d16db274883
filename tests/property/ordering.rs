//! Module resolution stability and cycle detection properties

use layerfold::error::PipelineError;
use layerfold::module::{ModuleDescriptor, ModuleRegistry, ModuleResolver};
use proptest::prelude::*;

fn registry_for(names: &[String]) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    for name in names {
        registry.register(ModuleDescriptor::new(name.clone()));
    }
    registry
}

proptest! {
    #[test]
    fn prop_unconstrained_modules_keep_declaration_order(
        names in Just((0..8).map(|i| format!("m{}", i)).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let registry = registry_for(&names);
        let order = ModuleResolver::new(&registry).resolve(&names).unwrap();
        prop_assert_eq!(order, names);
    }

    #[test]
    fn prop_ring_of_after_constraints_is_a_cycle(size in 1usize..8) {
        let names: Vec<String> = (0..size).map(|i| format!("m{}", i)).collect();
        let mut registry = ModuleRegistry::new();
        for (i, name) in names.iter().enumerate() {
            let previous = &names[(i + size - 1) % size];
            registry.register(ModuleDescriptor::new(name.clone()).after(previous.clone()));
        }

        match ModuleResolver::new(&registry).resolve(&names) {
            Err(PipelineError::ModuleCycle { cycle }) => {
                prop_assert_eq!(cycle.len(), size);
                prop_assert_eq!(&cycle[0], &names[0]);
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn prop_chain_constraints_are_satisfied(
        names in Just((0..6).map(|i| format!("m{}", i)).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        // Every module must follow the one with the next-lower numeric suffix.
        let mut registry = ModuleRegistry::new();
        for name in &names {
            let index: usize = name[1..].parse().unwrap();
            let mut descriptor = ModuleDescriptor::new(name.clone());
            if index > 0 {
                descriptor = descriptor.after(format!("m{}", index - 1));
            }
            registry.register(descriptor);
        }

        let order = ModuleResolver::new(&registry).resolve(&names).unwrap();
        let expected: Vec<String> = (0..6).map(|i| format!("m{}", i)).collect();
        prop_assert_eq!(order, expected);
    }
}
