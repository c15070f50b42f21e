//! Error type for component entry points.

use thiserror::Error;

/// Errors a component entry point can raise back across the boundary.
#[derive(Debug, Clone, Error)]
pub enum NativeError {
    /// Type mismatch during argument conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Entry point failed internally
    #[error("Callee failed: {0}")]
    CalleeFailed(String),

    /// Caller is not permitted to invoke this entry point
    #[error("Access denied: {0}")]
    AccessDenied(String),
}
