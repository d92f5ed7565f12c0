//! # Registry - Reference Type Graph Host
//!
//! A small but complete host type system: types with (multiple) inheritance,
//! capability units that compose into types and into each other, and an
//! operation table on every node.
//!
//! ## Layout
//!
//! Types and units are nodes of one `petgraph` directed graph. Edges point
//! from the child to what it builds on:
//!
//! ```text
//!   Circle ──Extends(0)──▶ Shape
//!     │
//!     └──Composes(0)──▶ Drawable ──Composes(0)──▶ Named
//! ```
//!
//! Each edge carries its declaration position, because petgraph does not
//! preserve insertion order when walking neighbors and traversal order is
//! significant for every query here.
//!
//! Composition may change at any time (`compose` after operations were
//! declared); queries always reflect the current graph.

use std::collections::{HashMap, HashSet};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, trace};

use crate::capability::CapabilityUnit;
use crate::error::{GraphError, OperationError};
use crate::graph::{c3_merge, TypeGraph};
use crate::instance::{Instance, Value};
use crate::operation::{CallMode, Invocation, Operation, OperationHolder};
use crate::typedef::TypeDef;

/// A node: either a type or a capability unit.
#[derive(Debug, Clone)]
enum Node {
    Type(TypeDef),
    Unit(CapabilityUnit),
}

impl Node {
    fn holder(&self) -> &dyn OperationHolder {
        match self {
            Node::Type(t) => t,
            Node::Unit(u) => u,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Extends,
    Composes,
}

/// Edge weight: relationship plus position in the declaring list.
#[derive(Debug, Clone, Copy)]
struct Link {
    kind: LinkKind,
    position: usize,
}

/// The reference host.
#[derive(Debug, Default)]
pub struct Registry {
    graph: DiGraph<Node, Link>,
    index: HashMap<String, NodeIndex>,
    /// C3 order per type, fixed at definition since bases never change.
    linearizations: HashMap<String, Vec<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Definition
    // ------------------------------------------------------------------------

    /// Define a type with the given bases (declared order, nearest first).
    ///
    /// Fails if the name is taken, a base is unknown, or the bases admit no
    /// C3 linearization. A failed definition leaves the registry unchanged.
    pub fn define_type(&mut self, name: &str, bases: &[&str]) -> Result<(), GraphError> {
        self.ensure_free(name)?;
        let base_ix = bases
            .iter()
            .map(|b| self.type_index(b))
            .collect::<Result<Vec<_>, _>>()?;
        let base_seqs = bases
            .iter()
            .map(|b| self.linearized_names(b))
            .collect::<Result<Vec<_>, _>>()?;
        let linearization = c3_merge(
            name,
            bases.iter().map(|b| b.to_string()).collect(),
            base_seqs,
        )?;

        let ix = self.graph.add_node(Node::Type(TypeDef::new(name)));
        for (position, base) in base_ix.into_iter().enumerate() {
            self.graph.add_edge(
                ix,
                base,
                Link {
                    kind: LinkKind::Extends,
                    position,
                },
            );
        }
        self.index.insert(name.to_string(), ix);
        self.linearizations.insert(name.to_string(), linearization);
        debug!(type_name = name, ?bases, "defined type");
        Ok(())
    }

    /// Define a capability unit that composes `composes` (declared order).
    pub fn define_unit(&mut self, name: &str, composes: &[&str]) -> Result<(), GraphError> {
        self.add_unit(CapabilityUnit::new(name), composes)
    }

    /// Define a synthetic grouping of units. Composites are flattened through
    /// and never act as operation holders themselves.
    pub fn define_composite(&mut self, name: &str, members: &[&str]) -> Result<(), GraphError> {
        self.add_unit(CapabilityUnit::composite(name), members)
    }

    fn add_unit(&mut self, unit: CapabilityUnit, composes: &[&str]) -> Result<(), GraphError> {
        let name = unit.name().to_string();
        self.ensure_free(&name)?;
        let members = composes
            .iter()
            .map(|u| self.unit_index(u))
            .collect::<Result<Vec<_>, _>>()?;

        let ix = self.graph.add_node(Node::Unit(unit));
        for (position, member) in members.into_iter().enumerate() {
            self.graph.add_edge(
                ix,
                member,
                Link {
                    kind: LinkKind::Composes,
                    position,
                },
            );
        }
        self.index.insert(name.clone(), ix);
        debug!(unit = %name, ?composes, "defined capability unit");
        Ok(())
    }

    /// Compose `unit` into `target` (a type or another unit), after any
    /// units it already composes.
    ///
    /// Composing a unit that is already directly composed is a no-op.
    pub fn compose(&mut self, target: &str, unit: &str) -> Result<(), GraphError> {
        let target_ix = self.node_index(target)?;
        let unit_ix = self.unit_index(unit)?;

        let existing = self.ordered_links(target_ix, LinkKind::Composes);
        if existing.contains(&unit_ix) {
            return Ok(());
        }

        let edge = self.graph.add_edge(
            target_ix,
            unit_ix,
            Link {
                kind: LinkKind::Composes,
                position: existing.len(),
            },
        );
        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(GraphError::Cycle {
                target: target.to_string(),
                unit: unit.to_string(),
            });
        }
        debug!(holder = target, unit, "composed capability unit");
        Ok(())
    }

    /// Bind an operation on a type or unit. Returns the displaced operation.
    pub fn add_operation(
        &mut self,
        holder: &str,
        name: &str,
        op: Operation,
    ) -> Result<Option<Operation>, GraphError> {
        let ix = self.node_index(holder)?;
        trace!(holder, operation = name, "adding operation");
        Ok(match &mut self.graph[ix] {
            Node::Type(t) => t.add_operation(name, op),
            Node::Unit(u) => u.add_operation(name, op),
        })
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        match self.graph.node_weight(*self.index.get(name)?)? {
            Node::Type(t) => Some(t),
            Node::Unit(_) => None,
        }
    }

    pub fn type_def_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        match self.graph.node_weight_mut(*self.index.get(name)?)? {
            Node::Type(t) => Some(t),
            Node::Unit(_) => None,
        }
    }

    pub fn unit(&self, name: &str) -> Option<&CapabilityUnit> {
        match self.graph.node_weight(*self.index.get(name)?)? {
            Node::Unit(u) => Some(u),
            Node::Type(_) => None,
        }
    }

    pub fn unit_mut(&mut self, name: &str) -> Option<&mut CapabilityUnit> {
        match self.graph.node_weight_mut(*self.index.get(name)?)? {
            Node::Unit(u) => Some(u),
            Node::Type(_) => None,
        }
    }

    /// Direct bases of a type in declared order.
    pub fn bases(&self, type_name: &str) -> Result<Vec<&str>, GraphError> {
        let ix = self.type_index(type_name)?;
        Ok(self
            .ordered_links(ix, LinkKind::Extends)
            .into_iter()
            .map(|b| self.graph[b].holder().holder_name())
            .collect())
    }

    /// Names in linearization order, `type_name` first.
    pub fn linearized_names(&self, type_name: &str) -> Result<Vec<String>, GraphError> {
        self.type_index(type_name)?;
        self.linearizations
            .get(type_name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownType {
                name: type_name.to_string(),
            })
    }

    // ------------------------------------------------------------------------
    // Calling
    // ------------------------------------------------------------------------

    /// Call `name` on `instance` with every returned value kept.
    pub fn call(
        &self,
        instance: &Instance,
        name: &str,
        args: &[Value],
    ) -> Result<Vec<Value>, OperationError> {
        self.call_in(instance, name, args, CallMode::Multi)
    }

    /// Call `name` on `instance` in the given mode.
    ///
    /// The operation is the first one found walking the instance type's
    /// linearization. Only type tables are searched.
    pub fn call_in(
        &self,
        instance: &Instance,
        name: &str,
        args: &[Value],
        mode: CallMode,
    ) -> Result<Vec<Value>, OperationError> {
        let op = self.resolve(&instance.type_name, name)?;
        let invocation = Invocation::new(self, instance, args).with_mode(mode);
        Ok(mode.capture(op.invoke(&invocation)?))
    }

    /// The operation `name` as seen from `type_name`.
    pub fn resolve(&self, type_name: &str, name: &str) -> Result<Operation, OperationError> {
        self.linearized_ancestors(type_name)?
            .into_iter()
            .find_map(|holder| holder.operation(name).cloned())
            .ok_or_else(|| OperationError::NoSuchOperation {
                type_name: type_name.to_string(),
                operation: name.to_string(),
            })
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn ensure_free(&self, name: &str) -> Result<(), GraphError> {
        if self.index.contains_key(name) {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn node_index(&self, name: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownType {
                name: name.to_string(),
            })
    }

    fn type_index(&self, name: &str) -> Result<NodeIndex, GraphError> {
        match self.index.get(name) {
            Some(&ix) if matches!(self.graph[ix], Node::Type(_)) => Ok(ix),
            _ => Err(GraphError::UnknownType {
                name: name.to_string(),
            }),
        }
    }

    fn unit_index(&self, name: &str) -> Result<NodeIndex, GraphError> {
        match self.index.get(name) {
            Some(&ix) if matches!(self.graph[ix], Node::Unit(_)) => Ok(ix),
            _ => Err(GraphError::UnknownUnit {
                name: name.to_string(),
            }),
        }
    }

    /// Targets of `kind` edges out of `ix`, sorted by declaration position.
    fn ordered_links(&self, ix: NodeIndex, kind: LinkKind) -> Vec<NodeIndex> {
        let mut links: Vec<(usize, NodeIndex)> = self
            .graph
            .edges(ix)
            .filter(|e| e.weight().kind == kind)
            .map(|e| (e.weight().position, e.target()))
            .collect();
        links.sort_by_key(|(position, _)| *position);
        links.into_iter().map(|(_, target)| target).collect()
    }

    /// Pre-order walk of composed units, first occurrence wins.
    fn flatten_units(&self, ix: NodeIndex, seen: &mut HashSet<NodeIndex>, out: &mut Vec<NodeIndex>) {
        for child in self.ordered_links(ix, LinkKind::Composes) {
            if !seen.insert(child) {
                continue;
            }
            if let Node::Unit(unit) = &self.graph[child] {
                if !unit.is_composite() {
                    out.push(child);
                }
            }
            self.flatten_units(child, seen, out);
        }
    }
}

impl TypeGraph for Registry {
    fn linearized_ancestors(
        &self,
        type_name: &str,
    ) -> Result<Vec<&dyn OperationHolder>, GraphError> {
        self.linearized_names(type_name)?
            .iter()
            .map(|name| self.type_index(name).map(|ix| self.graph[ix].holder()))
            .collect()
    }

    fn composed_capability_units(
        &self,
        type_name: &str,
    ) -> Result<Vec<&dyn OperationHolder>, GraphError> {
        let ix = self.type_index(type_name)?;
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        self.flatten_units(ix, &mut seen, &mut units);
        Ok(units.into_iter().map(|u| self.graph[u].holder()).collect())
    }
}
