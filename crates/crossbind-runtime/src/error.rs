//! Binding and invocation error taxonomy.

use thiserror::Error;

/// Everything that can go wrong while binding to a component or calling
/// through a resolved handle.
///
/// These never cross the runtime's public boundary as panics: each
/// failure is reported once through the registered hook and the
/// operation returns an absent result.
#[derive(Debug, Clone, Error)]
pub enum BindError {
    /// Component is not installed on this host
    #[error("Component not found: {identity}")]
    ComponentNotFound {
        /// Identity that was requested
        identity: String,
    },

    /// Host policy forbids loading code from the component
    #[error("Security policy denied loading component '{identity}': {reason}")]
    SecurityDenied {
        /// Identity that was requested
        identity: String,
        /// Host-supplied reason
        reason: String,
    },

    /// Class identity not exposed by the bound component
    #[error("Class not found: {class}")]
    ClassNotFound {
        /// Class identity that was requested
        class: String,
    },

    /// No constructor/method under that name + signature
    #[error("Member not found: {class}.{signature}")]
    MemberNotFound {
        /// Owning class identity
        class: String,
        /// Mangled name + parameter signature
        signature: String,
    },

    /// Arguments do not match the resolved signature
    #[error("Argument mismatch calling {signature}: {detail}")]
    ArgumentMismatch {
        /// Signature being invoked
        signature: String,
        /// What was wrong
        detail: String,
    },

    /// The callee raised internally
    #[error("Invocation failed: {0}")]
    InvocationFailed(String),

    /// The callee refused the caller
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Discovered component version is older than expected or malformed
    #[error("Version incompatible: discovered '{discovered}', expected '{expected}'")]
    VersionIncompatible {
        /// Version the component reported
        discovered: String,
        /// Version the client was built against
        expected: String,
    },
}
