//! Types.
//!
//! A [`TypeDef`] owns the operations defined directly on it. Its bases and
//! composed units are edges in the [`Registry`](crate::registry::Registry)
//! graph, not fields here, so a `TypeDef` can also be used by hosts that
//! keep their hierarchy elsewhere.

use crate::operation::{Operation, OperationHolder, OperationTable};

#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    table: OperationTable,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: OperationTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind an operation in this type's own table. Returns the displaced one.
    pub fn add_operation(&mut self, name: impl Into<String>, op: Operation) -> Option<Operation> {
        self.table.insert(name, op)
    }

    pub fn remove_operation(&mut self, name: &str) -> Option<Operation> {
        self.table.remove(name)
    }
}

impl OperationHolder for TypeDef {
    fn holder_name(&self) -> &str {
        &self.name
    }

    fn operations(&self) -> &OperationTable {
        &self.table
    }
}
