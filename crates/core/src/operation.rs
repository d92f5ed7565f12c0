//! # Operations and Operation Tables
//!
//! Every type and capability unit owns an [`OperationTable`]: an explicit,
//! inspectable map from operation name to [`Operation`]. Nothing here uses
//! ambient reflection; installing or relocating an operation is an ordinary
//! mutation of a table.
//!
//! Each operation carries an [`OperationOrigin`] tag so that code which
//! mutates tables (the collect engine) can tell its own installations apart
//! from user-written operations.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::graph::TypeGraph;
use crate::instance::{Instance, Value};

/// Prefix reserved for relocated user operations.
pub const RELOCATION_PREFIX: &str = "__collect_original__";

/// The private name a relocated `name` operation lives under.
pub fn relocated_name(name: &str) -> String {
    format!("{RELOCATION_PREFIX}{name}")
}

// ============================================================================
// Call Mode
// ============================================================================

/// How many values a call is expected to produce.
///
/// `Multi` keeps everything an operation returns. `Single` keeps exactly one
/// value: the last one returned, or `Value::Null` when the operation returned
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    #[serde(alias = "scalar")]
    Single,
    #[default]
    #[serde(alias = "list")]
    Multi,
}

impl CallMode {
    /// Parse a literal, accepting the `list` / `scalar` aliases.
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "multi" | "list" => Some(CallMode::Multi),
            "single" | "scalar" => Some(CallMode::Single),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallMode::Single => "single",
            CallMode::Multi => "multi",
        }
    }

    /// Reduce a returned list according to this mode.
    pub fn capture(self, mut values: Vec<Value>) -> Vec<Value> {
        match self {
            CallMode::Multi => values,
            CallMode::Single => vec![values.pop().unwrap_or(Value::Null)],
        }
    }
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// Everything an operation body sees when it runs.
///
/// The graph is passed in rather than captured so that bodies always observe
/// the type system as it is at call time.
pub struct Invocation<'a> {
    pub graph: &'a dyn TypeGraph,
    pub invocant: &'a Instance,
    pub args: &'a [Value],
    pub mode: CallMode,
}

impl<'a> Invocation<'a> {
    pub fn new(graph: &'a dyn TypeGraph, invocant: &'a Instance, args: &'a [Value]) -> Self {
        Self {
            graph,
            invocant,
            args,
            mode: CallMode::Multi,
        }
    }

    pub fn with_mode(mut self, mode: CallMode) -> Self {
        self.mode = mode;
        self
    }
}

// ============================================================================
// Operation
// ============================================================================

/// The callable part of an operation.
pub type OperationFn = dyn Fn(&Invocation<'_>) -> Result<Vec<Value>, OperationError> + Send + Sync;

/// Where an operation in a table came from.
#[derive(Clone)]
pub enum OperationOrigin {
    /// Written by the type's author.
    User,
    /// A user operation moved aside to make room for a derived operation.
    Relocated,
    /// Installed by a collect declaration. The payload is the declaration's
    /// configuration, opaque to this crate.
    Collected(Arc<dyn Any + Send + Sync>),
}

impl OperationOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            OperationOrigin::User => "user",
            OperationOrigin::Relocated => "relocated",
            OperationOrigin::Collected(_) => "collected",
        }
    }
}

impl fmt::Debug for OperationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named operation's implementation plus its origin tag.
///
/// Cloning is cheap: the body is shared.
#[derive(Clone)]
pub struct Operation {
    body: Arc<OperationFn>,
    origin: OperationOrigin,
}

impl Operation {
    /// A user-defined operation.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Vec<Value>, OperationError> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            origin: OperationOrigin::User,
        }
    }

    /// A user-defined operation that always returns `values`.
    pub fn returning(values: Vec<Value>) -> Self {
        Self::new(move |_| Ok(values.clone()))
    }

    /// An operation installed by a collect declaration.
    pub fn collected<F>(body: F, declaration: Arc<dyn Any + Send + Sync>) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Vec<Value>, OperationError> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            origin: OperationOrigin::Collected(declaration),
        }
    }

    /// The same body, retagged as relocated.
    pub fn into_relocated(self) -> Self {
        Self {
            body: self.body,
            origin: OperationOrigin::Relocated,
        }
    }

    pub fn origin(&self) -> &OperationOrigin {
        &self.origin
    }

    pub fn is_collected(&self) -> bool {
        matches!(self.origin, OperationOrigin::Collected(_))
    }

    /// The declaration payload of a collected operation.
    pub fn declaration(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        match &self.origin {
            OperationOrigin::Collected(decl) => Some(decl),
            _ => None,
        }
    }

    /// Run the body. The result is not reduced by `invocation.mode`; callers
    /// decide whether to apply [`CallMode::capture`].
    pub fn invoke(&self, invocation: &Invocation<'_>) -> Result<Vec<Value>, OperationError> {
        (self.body)(invocation)
    }

    /// Whether two handles share one body.
    pub fn same_body(&self, other: &Operation) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("origin", &self.origin)
            .finish()
    }
}

// ============================================================================
// Operation Table
// ============================================================================

/// Name → operation map owned by a single type or capability unit.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    entries: BTreeMap<String, Operation>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.entries.get(name)
    }

    /// Bind `op` under `name`, returning whatever was there before.
    pub fn insert(&mut self, name: impl Into<String>, op: Operation) -> Option<Operation> {
        self.entries.insert(name.into(), op)
    }

    pub fn remove(&mut self, name: &str) -> Option<Operation> {
        self.entries.remove(name)
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Operation Holder
// ============================================================================

/// Anything that owns an operation table: types and capability units.
///
/// Provider lookup is written once against this trait, regardless of whether
/// the holder is an ancestor or a composed unit.
pub trait OperationHolder {
    /// The holder's unique name.
    fn holder_name(&self) -> &str;

    /// The holder's own operations (never inherited ones).
    fn operations(&self) -> &OperationTable;

    fn has_operation(&self, name: &str) -> bool {
        self.operations().contains(name)
    }

    fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations().get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_keeps_last_value() {
        let captured = CallMode::Single.capture(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(captured, vec![json!(3)]);
    }

    #[test]
    fn test_single_marks_empty_with_null() {
        assert_eq!(CallMode::Single.capture(vec![]), vec![Value::Null]);
    }

    #[test]
    fn test_multi_keeps_everything() {
        let values = vec![json!("a"), json!("b")];
        assert_eq!(CallMode::Multi.capture(values.clone()), values);
        assert!(CallMode::Multi.capture(vec![]).is_empty());
    }

    #[test]
    fn test_call_mode_aliases() {
        assert_eq!(CallMode::from_literal("list"), Some(CallMode::Multi));
        assert_eq!(CallMode::from_literal("scalar"), Some(CallMode::Single));
        assert_eq!(CallMode::from_literal("Multi"), None);
        let parsed: CallMode = serde_json::from_value(json!("scalar")).unwrap();
        assert_eq!(parsed, CallMode::Single);
    }

    #[test]
    fn test_relocation_keeps_body_and_retags() {
        let op = Operation::returning(vec![json!(1)]);
        let moved = op.clone().into_relocated();
        assert!(moved.same_body(&op));
        assert!(matches!(moved.origin(), OperationOrigin::Relocated));
        assert!(!moved.is_collected());
    }

    #[test]
    fn test_collected_exposes_declaration() {
        let op = Operation::collected(|_| Ok(vec![]), Arc::new("decl"));
        assert!(op.is_collected());
        let decl = op.declaration().unwrap();
        assert_eq!(decl.downcast_ref::<&str>(), Some(&"decl"));
    }

    #[test]
    fn test_table_insert_returns_previous() {
        let mut table = OperationTable::new();
        assert!(table.insert("items", Operation::returning(vec![])).is_none());
        assert!(table.insert("items", Operation::returning(vec![])).is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["items"]);
        assert!(table.remove("items").is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn test_relocated_name_uses_prefix() {
        assert_eq!(relocated_name("items"), "__collect_original__items");
    }
}
