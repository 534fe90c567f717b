// ABOUTME: Error types for parsing and evaluation failures in the D interpreter

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";

/// Errors produced while turning source text into tokens or an AST.
///
/// Every variant carries the byte offset into the source at which the
/// problem was found, so a host can render a line/column if it wants to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("at position {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("at position {pos}: unexpected end of input, expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("at position {pos}: {message}")]
    InvalidToken { pos: usize, message: String },
}

impl ParseError {
    pub fn unexpected(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn eof(pos: usize, expected: impl Into<String>) -> Self {
        ParseError::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid(pos: usize, message: impl Into<String>) -> Self {
        ParseError::InvalidToken {
            pos,
            message: message.into(),
        }
    }
}

/// Errors produced while evaluating an AST against an environment.
///
/// This is the single fallible result type shared by pure operations
/// (arithmetic, type tests) and effectful ones (environment lookup and
/// mutation) — see spec §7/§9 "Error unification".
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// Lookup or assignment against an undeclared name.
    #[error("{action}: {name}")]
    UnboundVar { action: String, name: String },

    /// An operator or construct received a value of the wrong kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Call arity did not match the callee's parameter count.
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    NumArgs { expected: String, got: usize },

    /// The call target does not evaluate to something callable.
    #[error("{message}: {repr}")]
    NotFunction { message: String, repr: String },

    /// A tuple member or array/string index did not exist.
    #[error("no such attribute {key} on {container}")]
    AttributeError { container: String, key: String },

    /// Attempt to use `Empty` where a value is required.
    #[error("attempted to use Empty as a value")]
    NullAccess,

    /// Reserved for host extension.
    #[error("{0}")]
    Default(String),
}

impl RuntimeError {
    pub fn unbound_get(name: &str) -> Self {
        RuntimeError::UnboundVar {
            action: "Getting an unbound variable".to_string(),
            name: name.to_string(),
        }
    }

    pub fn unbound_set(name: &str) -> Self {
        RuntimeError::UnboundVar {
            action: "Setting an unbound variable".to_string(),
            name: name.to_string(),
        }
    }

    pub fn type_error(expected: &str, found: &Value) -> Self {
        RuntimeError::TypeMismatch {
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }

    pub fn type_error_named(expected: &str, found: &str) -> Self {
        RuntimeError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn arity_error(expected: impl Into<String>, got: usize) -> Self {
        RuntimeError::NumArgs {
            expected: expected.into(),
            got,
        }
    }

    pub fn not_function(value: &Value) -> Self {
        RuntimeError::NotFunction {
            message: "value is not callable".to_string(),
            repr: format!("{}", value),
        }
    }

    pub fn attribute_error(container: &Value, key: impl Into<String>) -> Self {
        RuntimeError::AttributeError {
            container: format!("{}", container),
            key: key.into(),
        }
    }
}

/// Convenience union of the two fallible layers, used only by the
/// embedding host (see `run` in `lib.rs`). The core API keeps `parse`
/// and `exec` returning their own distinct error types as specified.
#[derive(Error, Debug, Clone)]
pub enum DError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
