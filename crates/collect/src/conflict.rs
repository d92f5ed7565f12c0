//! Conflict resolution between a derived operation and an existing one.
//!
//! `collect("items")` on a type that already defines `items` would clobber
//! the author's operation. Instead the original is moved to a reserved
//! private name, retagged as relocated, and keeps participating as the
//! `self` provider.
//!
//! The move happens at most once per provider name. Re-declaring finds a
//! collect-installed operation under the name and reuses the relocation
//! already in place, so repeated declarations never lose the original.

use method_collect_core::{relocated_name, Operation, OperationHolder, TypeDef};
use tracing::debug;

use crate::config::CollectConfig;

/// Make room for `config`'s derived operation on `type_def`.
///
/// Returns the relocated self provider, if one exists after the call.
/// Does nothing unless the derived and provider names coincide.
pub fn prepare(type_def: &mut TypeDef, config: &CollectConfig) -> Option<Operation> {
    if config.derived_name != config.provider_name {
        return None;
    }
    let name = config.provider_name.as_str();
    let private = relocated_name(name);

    let existing_is_user = type_def.operation(name).map(|op| !op.is_collected());
    match existing_is_user {
        Some(true) => {
            let original = type_def.remove_operation(name)?.into_relocated();
            if type_def
                .add_operation(private.clone(), original.clone())
                .is_some()
            {
                debug!(type_name = type_def.name(), operation = name, "replaced stale relocation");
            }
            config.hook.on_relocate(type_def.name(), name, &private);
            Some(original)
        }
        // A previous declaration's operation, or nothing at all
        _ => type_def.operation(&private).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use method_collect_core::{OperationOrigin, Value};
    use std::sync::Arc;

    fn user_op() -> Operation {
        Operation::returning(vec![Value::from("original")])
    }

    fn derived_op() -> Operation {
        Operation::collected(|_| Ok(vec![]), Arc::new(()))
    }

    #[test]
    fn test_relocates_user_operation() {
        let mut t = TypeDef::new("T");
        let op = user_op();
        t.add_operation("items", op.clone());

        let relocated = prepare(&mut t, &CollectConfig::new("items")).unwrap();
        assert!(relocated.same_body(&op));
        assert!(matches!(relocated.origin(), OperationOrigin::Relocated));
        assert!(!t.has_operation("items"));
        assert!(t.has_operation("__collect_original__items"));
    }

    #[test]
    fn test_no_existing_operation() {
        let mut t = TypeDef::new("T");
        assert!(prepare(&mut t, &CollectConfig::new("items")).is_none());
        assert!(t.operations().is_empty());
    }

    #[test]
    fn test_different_names_untouched() {
        let mut t = TypeDef::new("T");
        t.add_operation("items", user_op());
        let config = CollectConfig::new("all_items").with_provider("items");

        assert!(prepare(&mut t, &config).is_none());
        assert!(t.has_operation("items"));
        assert!(!t.has_operation("__collect_original__items"));
    }

    #[test]
    fn test_redeclaration_reuses_relocation() {
        let mut t = TypeDef::new("T");
        let op = user_op();
        t.add_operation("items", op.clone());
        let config = CollectConfig::new("items");

        prepare(&mut t, &config).unwrap();
        t.add_operation("items", derived_op());

        let again = prepare(&mut t, &config).unwrap();
        assert!(again.same_body(&op));
        // The derived op was not relocated over the original
        assert!(t.operation("items").unwrap().is_collected());
    }

    #[test]
    fn test_derived_without_relocation() {
        let mut t = TypeDef::new("T");
        t.add_operation("items", derived_op());
        assert!(prepare(&mut t, &CollectConfig::new("items")).is_none());
        assert!(t.operation("items").unwrap().is_collected());
    }

    #[test]
    fn test_redefined_user_operation_replaces_stale_relocation() {
        let mut t = TypeDef::new("T");
        t.add_operation("items", user_op());
        let config = CollectConfig::new("items");
        prepare(&mut t, &config).unwrap();

        // The author redefines items after the declaration
        let newer = Operation::returning(vec![Value::from("newer")]);
        t.add_operation("items", newer.clone());
        let relocated = prepare(&mut t, &config).unwrap();

        assert!(relocated.same_body(&newer));
        assert!(t
            .operation("__collect_original__items")
            .unwrap()
            .same_body(&newer));
    }
}
