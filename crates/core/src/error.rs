//! # Error Types
//!
//! Two families of failure live in the object model:
//!
//! - [`GraphError`]: the type graph itself is malformed or was asked about
//!   something it doesn't know (unknown type, cyclic composition, a hierarchy
//!   with no consistent linearization).
//! - [`OperationError`]: invoking an operation failed. Provider bodies return
//!   this type, and derived operations hand it back to their caller untouched.

use thiserror::Error;

/// Errors raised while building or querying the type graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No type with this name has been defined.
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// No capability unit with this name has been defined.
    #[error("Unknown capability unit: {name}")]
    UnknownUnit { name: String },

    /// A type or unit with this name already exists.
    #[error("Name already defined: {name}")]
    DuplicateName { name: String },

    /// Adding the edge would make composition cyclic.
    #[error("Composing {unit} into {target} would create a cycle")]
    Cycle { target: String, unit: String },

    /// C3 merge found no valid head for this type's bases.
    #[error("Inconsistent hierarchy: no linearization exists for {name}")]
    InconsistentHierarchy { name: String },
}

/// Errors raised by operation bodies.
///
/// The engine never wraps these: whatever a provider returns is what the
/// derived operation's caller sees.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    /// The operation body reported a failure.
    #[error("Operation failed: {message}")]
    Failed { message: String },

    /// The operation could not be resolved on the invocant's type.
    #[error("No operation {operation} on {type_name}")]
    NoSuchOperation {
        type_name: String,
        operation: String,
    },

    /// Querying the type graph failed mid-call.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl OperationError {
    /// Shorthand for [`OperationError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed {
            message: message.into(),
        }
    }
}
