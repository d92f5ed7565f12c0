//! Error types for collect declarations.
//!
//! Everything here is a declaration error: it is raised before the target
//! type is touched, so a rejected declaration never half-installs. Call-time
//! failures use [`OperationError`](method_collect_core::OperationError) and
//! are not wrapped.

use method_collect_core::GraphError;
use thiserror::Error;

/// A malformed `collect` configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A derived or provider name is not a usable identifier.
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The name collides with the prefix reserved for relocated operations.
    #[error("Name {name:?} uses the reserved relocation prefix")]
    ReservedName { name: String },

    /// Options must come in key/value pairs.
    #[error("Option list has odd length {len}")]
    OddOptionList { len: usize },

    /// An option key was not a string.
    #[error("Option key at position {position} is not a string")]
    NonStringKey { position: usize },

    /// Unknown option key.
    #[error("Unknown option: {key}")]
    UnknownOption { key: String },

    /// An enumerated option got a literal outside its set.
    #[error("Invalid value {literal:?} for option {option}")]
    InvalidLiteral { option: &'static str, literal: String },

    /// An option got a value of the wrong kind.
    #[error("Option {option} expects {expected}")]
    InvalidValue {
        option: &'static str,
        expected: &'static str,
    },

    /// `from` was given an empty list.
    #[error("Option from needs at least one source")]
    EmptySources,
}

/// Failure to declare a derived operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeclareError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The target type is not known to the host.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
