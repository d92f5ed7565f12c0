//! # Linearization Properties
//!
//! Property tests over randomly shaped hierarchies.

use method_collect_core::{OperationHolder, Registry, TypeGraph};
use proptest::prelude::*;

fn chain_registry(depth: usize) -> Registry {
    let mut reg = Registry::new();
    reg.define_type("T0", &[]).unwrap();
    for i in 1..depth {
        let parent = format!("T{}", i - 1);
        reg.define_type(&format!("T{i}"), &[parent.as_str()]).unwrap();
    }
    reg
}

proptest! {
    #[test]
    fn single_inheritance_is_the_parent_chain(depth in 1usize..12) {
        let reg = chain_registry(depth);
        let leaf = format!("T{}", depth - 1);
        let names: Vec<String> = reg
            .linearized_ancestors(&leaf)
            .unwrap()
            .into_iter()
            .map(|h| h.holder_name().to_string())
            .collect();
        let expected: Vec<String> = (0..depth).rev().map(|i| format!("T{i}")).collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn linearization_has_no_duplicates(width in 1usize..6) {
        // Every middle type inherits from one shared root; the leaf
        // inherits from all of them.
        let mut reg = Registry::new();
        reg.define_type("Root", &[]).unwrap();
        let mids: Vec<String> = (0..width).map(|i| format!("M{i}")).collect();
        for m in &mids {
            reg.define_type(m, &["Root"]).unwrap();
        }
        let mid_refs: Vec<&str> = mids.iter().map(String::as_str).collect();
        reg.define_type("Leaf", &mid_refs).unwrap();

        let names = reg.linearized_names("Leaf").unwrap();
        prop_assert_eq!(names.len(), width + 2);
        prop_assert_eq!(names.first().map(String::as_str), Some("Leaf"));
        prop_assert_eq!(names.last().map(String::as_str), Some("Root"));
        prop_assert_eq!(&names[1..=width], &mids[..]);
    }

    #[test]
    fn shared_unit_flattens_once(paths in 1usize..6) {
        let mut reg = Registry::new();
        reg.define_unit("Shared", &[]).unwrap();
        reg.define_type("T", &[]).unwrap();
        for i in 0..paths {
            let name = format!("Via{i}");
            reg.define_unit(&name, &["Shared"]).unwrap();
            reg.compose("T", &name).unwrap();
        }
        let units = reg.composed_capability_units("T").unwrap();
        let shared = units.iter().filter(|u| u.holder_name() == "Shared").count();
        prop_assert_eq!(shared, 1);
        prop_assert_eq!(units.len(), paths + 1);
    }
}
