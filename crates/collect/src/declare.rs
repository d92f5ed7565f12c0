//! The declaration entry points.
//!
//! Declaring runs, in order: resolve the configuration, check the target,
//! relocate a conflicting operation, install. Every check happens before
//! the first mutation, and relocation is the last step before the
//! installation itself, so a rejected declaration leaves the type exactly
//! as it was.
//!
//! # Example
//!
//! ```
//! use method_collect::{collect, collect_args, Aggregator};
//! use method_collect_core::{Instance, Operation, Registry};
//! use serde_json::json;
//!
//! let mut reg = Registry::new();
//! reg.define_type("Base", &[]).unwrap();
//! reg.define_type("Child", &["Base"]).unwrap();
//! reg.add_operation("Base", "tags", Operation::returning(vec![json!("base")])).unwrap();
//! reg.add_operation("Child", "tags", Operation::returning(vec![json!("child")])).unwrap();
//!
//! collect(&mut reg, "Child", "tags", collect_args!["order", "reverse"]).unwrap();
//!
//! let tags = reg.call(&Instance::new("Child"), "tags", &[]).unwrap();
//! assert_eq!(tags, vec![json!("child"), json!("base")]);
//! ```

use std::sync::Arc;

use method_collect_core::{GraphError, Registry, TypeDef};

use crate::config::{resolve, Arg, CollectConfig};
use crate::conflict;
use crate::error::{ConfigError, DeclareError};
use crate::installer;

/// Declare a derived operation on `type_name` from raw arguments.
///
/// `args` is empty, a single aggregator, or a flat key/value option list;
/// see [`resolve`].
pub fn collect(
    registry: &mut Registry,
    type_name: &str,
    name: impl Into<Arg>,
    args: Vec<Arg>,
) -> Result<Arc<CollectConfig>, DeclareError> {
    let config = resolve(name, args)?;
    collect_with(registry, type_name, config)
}

/// Declare a derived operation on `type_name` from a built configuration.
pub fn collect_with(
    registry: &mut Registry,
    type_name: &str,
    config: CollectConfig,
) -> Result<Arc<CollectConfig>, DeclareError> {
    let type_def = registry
        .type_def_mut(type_name)
        .ok_or_else(|| GraphError::UnknownType {
            name: type_name.to_string(),
        })?;
    Ok(declare_on(type_def, config)?)
}

/// Declare directly on a type, for hosts that keep their own type tables.
///
/// The configuration is validated here, before the type is touched.
pub fn declare_on(
    type_def: &mut TypeDef,
    config: CollectConfig,
) -> Result<Arc<CollectConfig>, ConfigError> {
    config.validate()?;
    let config = Arc::new(config);

    conflict::prepare(type_def, &config);
    installer::install(type_def, Arc::clone(&config));
    config.hook.on_declare(type_def.name(), &config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Source;
    use method_collect_core::{Operation, OperationHolder};

    #[test]
    fn test_declare_on_validates_before_touching_type() {
        let mut t = TypeDef::new("T");
        t.add_operation("items", Operation::returning(vec![]));

        let bad = CollectConfig::new("items").with_sources(Vec::<Source>::new());
        assert_eq!(declare_on(&mut t, bad).unwrap_err(), ConfigError::EmptySources);
        assert!(!t.operation("items").unwrap().is_collected());
        assert!(!t.has_operation("__collect_original__items"));

        let reserved = CollectConfig::new("__collect_original__items");
        assert!(matches!(
            declare_on(&mut t, reserved),
            Err(ConfigError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_declare_on_installs_and_relocates() {
        let mut t = TypeDef::new("T");
        t.add_operation("items", Operation::returning(vec![]));

        let config = declare_on(&mut t, CollectConfig::new("items")).unwrap();
        assert_eq!(config.derived_name, "items");
        assert!(t.operation("items").unwrap().is_collected());
        assert!(t.has_operation("__collect_original__items"));
    }
}
