//! # Method Collect Core - Object Model
//!
//! This crate provides the object model the collect engine runs against:
//!
//! - **Operations**: Tagged callables in explicit per-holder tables
//! - **Holders**: Types and capability units, one shared lookup interface
//! - **Type graph**: The two ordered queries a host must answer
//! - **Registry**: A petgraph-backed reference host with C3 linearization
//! - **Errors**: Graph failures and operation failures
//!
//! ## Design Philosophy
//!
//! Method tables are values, not reflection. Installing, relocating, or
//! removing an operation is a plain mutation of an [`OperationTable`], and
//! every entry says where it came from. That makes the whole type system
//! inspectable in tests and lets the engine stay ignorant of how any
//! particular host stores its classes.

pub mod capability;
pub mod error;
pub mod graph;
pub mod instance;
pub mod operation;
pub mod registry;
pub mod typedef;

// Re-export key types at crate root for convenience
pub use capability::CapabilityUnit;
pub use error::{GraphError, OperationError};
pub use graph::{c3_merge, linearize, TypeGraph};
pub use instance::{Instance, Value};
pub use operation::{
    relocated_name, CallMode, Invocation, Operation, OperationFn, OperationHolder,
    OperationOrigin, OperationTable, RELOCATION_PREFIX,
};
pub use registry::Registry;
pub use typedef::TypeDef;
