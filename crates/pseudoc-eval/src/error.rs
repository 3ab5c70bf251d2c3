//! Runtime error taxonomy.
//!
//! Errors surface immediately and abort execution; the language has no
//! user-level error handling syntax.

use thiserror::Error;

/// Error raised while executing a program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Use of an undeclared variable, unknown callable, unknown user type,
    /// or unknown record field.
    #[error("name error: {0}")]
    Name(String),

    /// Coercion failure, an operator applied to incompatible values, a
    /// BYREF argument that is not an lvalue, dereferencing a non-pointer,
    /// indexing a non-array, or field access on a non-record.
    #[error("type error: {0}")]
    Type(String),

    /// Array index outside declared bounds, or the wrong number of indices.
    #[error("range error: {0}")]
    Range(String),

    /// An INPUT value incompatible with the declared type.
    #[error("input error: {0}")]
    Input(String),

    /// Failure on the underlying input or output stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
