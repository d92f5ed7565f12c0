//! The body of a derived operation.
//!
//! Every call walks the graph again: capability composition may have
//! changed since the declaration, and nothing is cached between calls.

use std::sync::Arc;

use method_collect_core::{Invocation, OperationError, Value};

use crate::config::CollectConfig;
use crate::locator::{locate, LocatePlan};

/// Runtime state of one installed derived operation.
#[derive(Debug, Clone)]
pub struct CollectionInvoker {
    config: Arc<CollectConfig>,
    plan: LocatePlan,
}

impl CollectionInvoker {
    pub fn new(config: Arc<CollectConfig>) -> Self {
        let plan = LocatePlan::new(&config);
        Self { config, plan }
    }

    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    pub fn plan(&self) -> &LocatePlan {
        &self.plan
    }

    /// Locate, call every provider with the same invocant and arguments,
    /// flatten, aggregate.
    ///
    /// The first provider error aborts the call and is returned as is.
    pub fn invoke(&self, invocation: &Invocation<'_>) -> Result<Vec<Value>, OperationError> {
        let config = &*self.config;
        let type_name = invocation.invocant.type_name.as_str();

        let providers = locate(invocation.graph, type_name, &self.plan)?;
        config
            .hook
            .on_locate(&config.derived_name, type_name, &providers);

        let call = Invocation {
            graph: invocation.graph,
            invocant: invocation.invocant,
            args: invocation.args,
            mode: config.call_mode,
        };

        let mut items = Vec::new();
        for provider in &providers {
            config.hook.on_provider_start(provider, call.args);
            let captured = config.call_mode.capture(provider.operation.invoke(&call)?);
            config.hook.on_provider_end(provider, &captured);
            items.extend(captured);
        }

        if items.is_empty() {
            config.hook.on_empty(&config.derived_name, type_name);
        }
        config.aggregator.apply(invocation.invocant, items)
    }
}
