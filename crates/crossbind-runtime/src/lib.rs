//! Crossbind runtime
//!
//! Run-time half of the cross-component binding machinery: locate a
//! separately deployed component, gate on its reported version, resolve
//! classes and members by name + signature, and forward calls through
//! the resolved handles. Generated facades sit on top of this crate;
//! nothing here knows concrete engine types.
//!
//! Failure model: every failed operation reports exactly once through
//! the registered [`FailureHook`] and returns an absent result. Callers
//! treat an absent bound component as "feature unavailable".

#![warn(missing_docs)]

mod binding;
mod error;
mod hook;
mod host;
pub mod loader;
mod resolver;
pub mod version;

pub use binding::{signature_of, ClassHandle, ComponentHandle, ConstructorHandle, MethodHandle};
pub use error::BindError;
pub use hook::{FailureHook, RecordingHook, SilentHook};
pub use host::{HostError, LoadFlags, LoadingContext, LoadingHost, RegistryHost};
pub use resolver::Resolver;

// Re-export the boundary types components are written against.
pub use crossbind_sdk::{
    ClassSpec, ComponentTable, Instance, NativeError, ParamType, Value, COMPONENT_INIT_SYMBOL,
};
