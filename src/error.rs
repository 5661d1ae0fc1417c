//! Error taxonomy (spec.md §7).
//!
//! Two independent families: parser errors, produced by the command
//! argument-resolution pass, and world-mutation errors, which are
//! programming errors that halt the current handler and get logged.

use crate::ids::ObjectId;
use thiserror::Error;

/// Errors from pattern matching and argument resolution (spec.md §4.4, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no compiled pattern matched the input")]
    PatternMismatch,

    #[error("required argument `{arg}` was not supplied")]
    MissingRequired { arg: String },

    #[error("could not resolve argument `{arg}`")]
    UnparseableArg { arg: String },
}

/// World-mutation errors (spec.md §4.1, §7). These represent programming
/// errors, not user mistakes: a command handler that triggers one should
/// log it and report a neutral failure message to the actor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("object {0} no longer exists")]
    Gone(ObjectId),
}

pub type EngineResult<T> = Result<T, EngineError>;
