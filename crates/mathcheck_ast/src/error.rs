//! Error types for mathcheck_ast crate.

use thiserror::Error;

/// Errors that can occur in AST operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// An `ExprId` that does not belong to the context it was used with
    #[error("expression id {0} is out of range for this context")]
    DanglingId(usize),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    InternalError(String),
}
