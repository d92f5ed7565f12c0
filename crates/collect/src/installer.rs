//! Binding derived operations, and finding them again.

use std::sync::Arc;

use method_collect_core::{Operation, OperationHolder, TypeDef};

use crate::config::CollectConfig;
use crate::invoker::CollectionInvoker;

/// Bind `config`'s derived operation in `type_def`'s own table.
///
/// The operation is tagged as collect-installed and carries its
/// configuration. Whatever was bound under the name before is returned;
/// the last declaration wins.
pub fn install(type_def: &mut TypeDef, config: Arc<CollectConfig>) -> Option<Operation> {
    let name = config.derived_name.clone();
    let invoker = CollectionInvoker::new(Arc::clone(&config));
    let op = Operation::collected(move |invocation| invoker.invoke(invocation), config);
    type_def.add_operation(name, op)
}

/// Configuration of the derived operation installed under `name`, if the
/// entry there is one.
pub fn installed_config(holder: &dyn OperationHolder, name: &str) -> Option<Arc<CollectConfig>> {
    let decl = holder.operation(name)?.declaration()?;
    Arc::clone(decl).downcast::<CollectConfig>().ok()
}

/// Every derived operation installed on `holder`, by name.
pub fn installed(holder: &dyn OperationHolder) -> Vec<Arc<CollectConfig>> {
    holder
        .operations()
        .names()
        .filter_map(|name| installed_config(holder, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Order;

    #[test]
    fn test_install_tags_operation() {
        let mut t = TypeDef::new("T");
        let displaced = install(&mut t, Arc::new(CollectConfig::new("items")));

        assert!(displaced.is_none());
        assert!(t.operation("items").unwrap().is_collected());
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut t = TypeDef::new("T");
        install(&mut t, Arc::new(CollectConfig::new("items")));
        let displaced = install(
            &mut t,
            Arc::new(CollectConfig::new("items").with_order(Order::Reverse)),
        );

        assert!(displaced.unwrap().is_collected());
        let config = installed_config(&t, "items").unwrap();
        assert_eq!(config.order, Order::Reverse);
        assert_eq!(installed(&t).len(), 1);
    }

    #[test]
    fn test_user_operations_are_not_installed_configs() {
        let mut t = TypeDef::new("T");
        t.add_operation("plain", Operation::returning(vec![]));
        install(&mut t, Arc::new(CollectConfig::new("items")));

        assert!(installed_config(&t, "plain").is_none());
        assert!(installed_config(&t, "missing").is_none());
        let names: Vec<_> = installed(&t)
            .iter()
            .map(|c| c.derived_name.clone())
            .collect();
        assert_eq!(names, vec!["items"]);
    }

    #[test]
    fn test_foreign_payload_is_ignored() {
        let mut t = TypeDef::new("T");
        t.add_operation("odd", Operation::collected(|_| Ok(vec![]), Arc::new(42u8)));
        assert!(installed_config(&t, "odd").is_none());
    }
}
