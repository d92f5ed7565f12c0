//! # Capability Units
//!
//! A capability unit (a role, a mixin) is a bundle of operations that can be
//! composed into a type, orthogonally to single-inheritance ancestry. Units
//! can compose other units, so what a type "does" is a transitive closure.
//!
//! Composite units are synthetic groupings: composing `[A, B]` together
//! produces a composite that is walked through during flattening but never
//! contributes operations of its own.

use crate::operation::{Operation, OperationHolder, OperationTable};

/// A composable unit of behavior.
#[derive(Debug, Clone)]
pub struct CapabilityUnit {
    name: String,
    composite: bool,
    table: OperationTable,
}

impl CapabilityUnit {
    /// A regular unit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            composite: false,
            table: OperationTable::new(),
        }
    }

    /// A synthetic grouping of other units.
    pub fn composite(name: impl Into<String>) -> Self {
        Self {
            composite: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    pub fn add_operation(&mut self, name: impl Into<String>, op: Operation) -> Option<Operation> {
        self.table.insert(name, op)
    }

    pub fn remove_operation(&mut self, name: &str) -> Option<Operation> {
        self.table.remove(name)
    }
}

impl OperationHolder for CapabilityUnit {
    fn holder_name(&self) -> &str {
        &self.name
    }

    fn operations(&self) -> &OperationTable {
        &self.table
    }
}
