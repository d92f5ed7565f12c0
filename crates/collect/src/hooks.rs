//! Collect hooks for observability.
//!
//! Hooks observe declarations and derived-operation calls without changing
//! them. Each declaration carries one hook (see
//! [`CollectConfig::with_hook`](crate::CollectConfig::with_hook)); the
//! default is [`TracingHook`], which reports through `tracing`.
//!
//! ## Events
//!
//! - `on_declare`: A derived operation was installed
//! - `on_relocate`: A user operation was moved aside to make room for one
//! - `on_locate`: Providers were located for a call
//! - `on_provider_start` / `on_provider_end`: Around each provider invocation
//! - `on_empty`: A call gathered nothing (the aggregator still runs)

use method_collect_core::Value;
use tracing::{debug, info, trace, warn};

use crate::config::CollectConfig;
use crate::locator::ProviderRef;

// ============================================================================
// Collect Hook Trait
// ============================================================================

/// Trait for observing collect events.
///
/// All methods have default no-op implementations, so you only need to
/// implement the events you care about.
pub trait CollectHook: Send + Sync {
    /// Called after a derived operation is bound on `type_name`.
    fn on_declare(&self, _type_name: &str, _config: &CollectConfig) {}

    /// Called when `provider_name` on `type_name` is moved to `private_name`.
    fn on_relocate(&self, _type_name: &str, _provider_name: &str, _private_name: &str) {}

    /// Called once per call with the providers about to run, in order.
    fn on_locate(&self, _derived_name: &str, _type_name: &str, _providers: &[ProviderRef]) {}

    /// Called before a provider runs.
    fn on_provider_start(&self, _provider: &ProviderRef, _args: &[Value]) {}

    /// Called with what was captured from a provider.
    fn on_provider_end(&self, _provider: &ProviderRef, _captured: &[Value]) {}

    /// Called when a call gathered no results at all.
    fn on_empty(&self, _derived_name: &str, _type_name: &str) {}
}

// ============================================================================
// Null Hook
// ============================================================================

/// A no-op hook for when no observation is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl CollectHook for NullHook {}

// ============================================================================
// Tracing Hook (Default)
// ============================================================================

/// Reports events as `tracing` events. Empty results are warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl CollectHook for TracingHook {
    fn on_declare(&self, type_name: &str, config: &CollectConfig) {
        info!(
            type_name,
            derived = %config.derived_name,
            provider = %config.provider_name,
            sources = ?config.sources,
            order = %config.order,
            call_mode = %config.call_mode,
            "installed derived operation"
        );
    }

    fn on_relocate(&self, type_name: &str, provider_name: &str, private_name: &str) {
        info!(type_name, provider_name, private_name, "relocated existing operation");
    }

    fn on_locate(&self, derived_name: &str, type_name: &str, providers: &[ProviderRef]) {
        debug!(
            derived_name,
            type_name,
            providers = ?providers.iter().map(ProviderRef::label).collect::<Vec<_>>(),
            "located providers"
        );
    }

    fn on_provider_start(&self, provider: &ProviderRef, args: &[Value]) {
        trace!(provider = %provider.label(), argc = args.len(), "invoking provider");
    }

    fn on_provider_end(&self, provider: &ProviderRef, captured: &[Value]) {
        trace!(provider = %provider.label(), captured = captured.len(), "provider returned");
    }

    fn on_empty(&self, derived_name: &str, type_name: &str) {
        warn!(derived_name, type_name, "no provider results collected");
    }
}

// ============================================================================
// Composite Hook
// ============================================================================

/// A hook that delegates to multiple inner hooks.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Box<dyn CollectHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the composite.
    pub fn with<H: CollectHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }
}

impl CollectHook for CompositeHook {
    fn on_declare(&self, type_name: &str, config: &CollectConfig) {
        for hook in &self.hooks {
            hook.on_declare(type_name, config);
        }
    }

    fn on_relocate(&self, type_name: &str, provider_name: &str, private_name: &str) {
        for hook in &self.hooks {
            hook.on_relocate(type_name, provider_name, private_name);
        }
    }

    fn on_locate(&self, derived_name: &str, type_name: &str, providers: &[ProviderRef]) {
        for hook in &self.hooks {
            hook.on_locate(derived_name, type_name, providers);
        }
    }

    fn on_provider_start(&self, provider: &ProviderRef, args: &[Value]) {
        for hook in &self.hooks {
            hook.on_provider_start(provider, args);
        }
    }

    fn on_provider_end(&self, provider: &ProviderRef, captured: &[Value]) {
        for hook in &self.hooks {
            hook.on_provider_end(provider, captured);
        }
    }

    fn on_empty(&self, derived_name: &str, type_name: &str) {
        for hook in &self.hooks {
            hook.on_empty(derived_name, type_name);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHook {
        empties: Arc<AtomicUsize>,
        declares: Arc<AtomicUsize>,
    }

    impl CountingHook {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let empties = Arc::new(AtomicUsize::new(0));
            let declares = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    empties: Arc::clone(&empties),
                    declares: Arc::clone(&declares),
                },
                empties,
                declares,
            )
        }
    }

    impl CollectHook for CountingHook {
        fn on_declare(&self, _type_name: &str, _config: &CollectConfig) {
            self.declares.fetch_add(1, Ordering::SeqCst);
        }

        fn on_empty(&self, _derived_name: &str, _type_name: &str) {
            self.empties.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_null_hook() {
        let hook = NullHook;
        // Should not panic
        hook.on_empty("items", "T");
        hook.on_declare("T", &CollectConfig::new("items"));
    }

    #[test]
    fn test_tracing_hook_emits_without_subscriber() {
        let hook = TracingHook;
        hook.on_empty("items", "T");
        hook.on_relocate("T", "items", "__collect_original__items");
    }

    #[test]
    fn test_counting_hook() {
        let (hook, empties, declares) = CountingHook::new();

        hook.on_empty("items", "T");
        hook.on_empty("items", "U");
        hook.on_declare("T", &CollectConfig::new("items"));

        assert_eq!(empties.load(Ordering::SeqCst), 2);
        assert_eq!(declares.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_composite_hook() {
        let (hook1, empties1, _) = CountingHook::new();
        let (hook2, empties2, _) = CountingHook::new();

        let composite = CompositeHook::new().with(hook1).with(hook2).with(NullHook);
        composite.on_empty("items", "T");

        assert_eq!(empties1.load(Ordering::SeqCst), 1);
        assert_eq!(empties2.load(Ordering::SeqCst), 1);
    }
}
