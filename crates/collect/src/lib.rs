//! # Method Collect
//!
//! Install, on a type, a derived operation that gathers the results of a
//! same-named operation across the type's ancestry and its composed
//! capability units, then reduces them with an aggregator.
//!
//! This crate builds on `method-collect-core` to provide:
//!
//! - **Configuration**: Declarative options, validated before anything is
//!   touched
//! - **Location**: Deterministic provider order from sources, order and
//!   recursion policy
//! - **Conflict resolution**: A pre-existing operation under the derived
//!   name is relocated and keeps contributing
//! - **Invocation**: Fresh lookup on every call, call-mode capture,
//!   flattening, aggregation
//! - **Hooks**: Observability through `tracing` by default
//!
//! ## Quick Start
//!
//! ```rust
//! use method_collect::{collect_with, CollectConfig, Source};
//! use method_collect_core::{Instance, Operation, Registry};
//! use serde_json::json;
//!
//! let mut reg = Registry::new();
//! reg.define_unit("Audited", &[]).unwrap();
//! reg.define_type("Account", &[]).unwrap();
//! reg.compose("Account", "Audited").unwrap();
//! reg.add_operation("Audited", "fields", Operation::returning(vec![json!("audit_log")])).unwrap();
//! reg.add_operation("Account", "fields", Operation::returning(vec![json!("balance")])).unwrap();
//!
//! let config = CollectConfig::new("fields")
//!     .with_sources([Source::Own, Source::Capabilities])
//!     .with_aggregator(|_, items| Ok(vec![json!(items.len())]));
//! collect_with(&mut reg, "Account", config).unwrap();
//!
//! let out = reg.call(&Instance::new("Account"), "fields", &[]).unwrap();
//! assert_eq!(out, vec![json!(2)]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        method-collect                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  config.rs     CollectConfig, resolve (declaration time)        │
//! │  locator.rs    LocatePlan, locate (call time)                   │
//! │  conflict.rs   prepare: relocate an existing operation          │
//! │  invoker.rs    CollectionInvoker: the derived operation body    │
//! │  installer.rs  install, installed                               │
//! │  declare.rs    collect, collect_with, declare_on                │
//! │  hooks.rs      CollectHook, TracingHook                         │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │ uses
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     method-collect-core                         │
//! │  TypeGraph, OperationHolder, Operation, Registry                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod conflict;
pub mod declare;
pub mod error;
pub mod hooks;
pub mod installer;
pub mod invoker;
pub mod locator;

// Re-export key types at crate root
pub use config::{resolve, Aggregator, Arg, CollectConfig, CollectDescriptor, Order, Source};
pub use declare::{collect, collect_with, declare_on};
pub use error::{ConfigError, DeclareError};
pub use hooks::{CollectHook, CompositeHook, NullHook, TracingHook};
pub use installer::{install, installed, installed_config};
pub use invoker::CollectionInvoker;
pub use locator::{locate, LocatePlan, ProviderRef};

// Re-export core types commonly used with declarations
pub use method_collect_core::{CallMode, Instance, Operation, Registry, Value};
