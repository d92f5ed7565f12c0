//! # Type Graph
//!
//! The [`TypeGraph`] trait is the whole contract between the collect engine
//! and a host type system: two ordered queries. Anything that can answer them
//! (the bundled [`Registry`](crate::registry::Registry), an interpreter's
//! class table, a test double) can host derived operations.
//!
//! Also here: C3 linearization, used by the registry to order ancestors.
//! For single inheritance it degenerates to the plain parent chain.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::operation::OperationHolder;

/// Host type system introspection.
///
/// Implementations must be deterministic: the same graph state always yields
/// the same sequences in the same order.
pub trait TypeGraph {
    /// `type_name` followed by its ancestors, most-derived first.
    fn linearized_ancestors(&self, type_name: &str)
        -> Result<Vec<&dyn OperationHolder>, GraphError>;

    /// Capability units composed by `type_name`, flattened transitively,
    /// de-duplicated by identity, composites excluded, in declared order.
    fn composed_capability_units(
        &self,
        type_name: &str,
    ) -> Result<Vec<&dyn OperationHolder>, GraphError>;
}

/// C3 linearization of `root`.
///
/// `parents` returns the direct bases of a type in declared order.
///
/// # Example
///
/// ```
/// use method_collect_core::graph::linearize;
///
/// // Diamond: D(B, C), B(A), C(A)
/// let parents = |name: &str| -> Vec<String> {
///     match name {
///         "D" => vec!["B".into(), "C".into()],
///         "B" | "C" => vec!["A".into()],
///         _ => vec![],
///     }
/// };
/// let mro = linearize("D", &parents).unwrap();
/// assert_eq!(mro, vec!["D", "B", "C", "A"]);
/// ```
pub fn linearize<F>(root: &str, parents: &F) -> Result<Vec<String>, GraphError>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut memo = HashMap::new();
    linearize_memo(root, parents, &mut memo)
}

fn linearize_memo<F>(
    root: &str,
    parents: &F,
    memo: &mut HashMap<String, Vec<String>>,
) -> Result<Vec<String>, GraphError>
where
    F: Fn(&str) -> Vec<String>,
{
    if let Some(done) = memo.get(root) {
        return Ok(done.clone());
    }
    let direct = parents(root);
    let mut seqs = Vec::with_capacity(direct.len() + 1);
    for parent in &direct {
        seqs.push(linearize_memo(parent, parents, memo)?);
    }
    let out = c3_merge(root, direct, seqs)?;
    memo.insert(root.to_string(), out.clone());
    Ok(out)
}

/// One C3 step: the linearization of `root` from its direct `bases` and
/// their already computed linearizations (same order as `bases`).
pub fn c3_merge(
    root: &str,
    bases: Vec<String>,
    mut seqs: Vec<Vec<String>>,
) -> Result<Vec<String>, GraphError> {
    seqs.push(bases);

    let mut out = vec![root.to_string()];
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Ok(out);
        }

        // A head is valid if it appears in no sequence's tail.
        let head = seqs
            .iter()
            .map(|s| &s[0])
            .find(|candidate| !seqs.iter().any(|s| s[1..].contains(*candidate)))
            .cloned()
            .ok_or_else(|| GraphError::InconsistentHierarchy {
                name: root.to_string(),
            })?;

        for seq in seqs.iter_mut() {
            if seq[0] == head {
                seq.remove(0);
            }
        }
        out.push(head);
    }
}
