//! # Provider Location
//!
//! Given an invocant's type and a declaration's [`LocatePlan`], compute the
//! ordered list of provider operations to call.
//!
//! ```text
//!   sources = [self, bases, capabilities]
//!
//!   self          ── chain[0]                  ── at most one
//!   bases         ── chain[1..] that define it ── all, or the nearest one
//!   capabilities  ── flattened composed units  ── all that define it
//!                                 │
//!                order = reverse ─┴─ reverses each of these two buckets
//! ```
//!
//! The plan is computed once per declaration; everything that depends on
//! the live type graph (ancestry, composition) is queried on every call.
//!
//! ## Effective providers
//!
//! A derived operation is never itself a provider. When a holder's entry
//! under the provider name is collect-installed, its relocated original
//! (if any) stands in for it. This keeps a base type that declared its own
//! `collect` from being walked twice, and lets a declaring type's original
//! operation keep contributing when the invocant is a subclass.

use method_collect_core::{GraphError, Operation, OperationHolder, TypeGraph};

use crate::config::{CollectConfig, Order, Source};

/// One provider operation found on one holder.
#[derive(Debug, Clone)]
pub struct ProviderRef {
    /// Bucket it was found in
    pub source: Source,
    /// Name of the type or unit it belongs to
    pub owner: String,
    pub operation: Operation,
}

impl ProviderRef {
    /// `source:owner`, for logs.
    pub fn label(&self) -> String {
        format!("{}:{}", self.source, self.owner)
    }
}

/// The declaration-time part of location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatePlan {
    pub provider_name: String,
    /// Where a relocated original lives
    pub private_name: String,
    pub buckets: Vec<Source>,
    pub order: Order,
    pub recurse_bases: bool,
}

impl LocatePlan {
    pub fn new(config: &CollectConfig) -> Self {
        Self {
            provider_name: config.provider_name.clone(),
            private_name: config.relocated_name(),
            buckets: config.sources.clone(),
            order: config.order,
            recurse_bases: config.recurse_bases,
        }
    }

    fn wants(&self, source: Source) -> bool {
        self.buckets.contains(&source)
    }

    /// The operation `holder` contributes, if any.
    pub fn effective_provider(&self, holder: &dyn OperationHolder) -> Option<Operation> {
        match holder.operation(&self.provider_name) {
            Some(op) if !op.is_collected() => Some(op.clone()),
            Some(_) => holder.operation(&self.private_name).cloned(),
            None => None,
        }
    }

    fn provider_ref(&self, source: Source, holder: &dyn OperationHolder) -> Option<ProviderRef> {
        self.effective_provider(holder).map(|operation| ProviderRef {
            source,
            owner: holder.holder_name().to_string(),
            operation,
        })
    }
}

/// Ordered providers for an invocant of `type_name`.
///
/// Holders that don't define the provider are skipped. An empty result is
/// not an error.
pub fn locate(
    graph: &dyn TypeGraph,
    type_name: &str,
    plan: &LocatePlan,
) -> Result<Vec<ProviderRef>, GraphError> {
    let chain = graph.linearized_ancestors(type_name)?;
    let units = if plan.wants(Source::Capabilities) {
        graph.composed_capability_units(type_name)?
    } else {
        Vec::new()
    };

    let mut providers = Vec::new();
    for &source in &plan.buckets {
        let mut bucket: Vec<ProviderRef> = match source {
            Source::Own => chain
                .first()
                .and_then(|own| plan.provider_ref(source, *own))
                .into_iter()
                .collect(),
            Source::Bases => {
                let definers = chain
                    .iter()
                    .skip(1)
                    .filter_map(|base| plan.provider_ref(source, *base));
                if plan.recurse_bases {
                    definers.collect()
                } else {
                    definers.take(1).collect()
                }
            }
            Source::Capabilities => units
                .iter()
                .filter_map(|unit| plan.provider_ref(source, *unit))
                .collect(),
        };
        if plan.order == Order::Reverse && source != Source::Own {
            bucket.reverse();
        }
        providers.extend(bucket);
    }
    Ok(providers)
}
