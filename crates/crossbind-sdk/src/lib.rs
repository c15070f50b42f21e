//! Crossbind SDK - Lightweight types for implementing binary components
//!
//! This crate provides the minimal types needed to implement a loadable
//! component without depending on the full crossbind runtime: the boundary
//! value model, the per-class member tables, and the component table a
//! loading host discovers classes through.
//!
//! # Example
//!
//! ```ignore
//! use crossbind_sdk::{ClassSpec, ComponentTable, ParamType, Value};
//!
//! let mut view = ClassSpec::new("RenderViewInternal");
//! view.register_method("load_url", &[ParamType::Str], false, |_inst, args| {
//!     let url = args[0].as_str().unwrap();
//!     println!("loading {url}");
//!     Ok(Value::Null)
//! });
//!
//! let mut table = ComponentTable::new("web.runtime", "3.0");
//! table.register_class(view);
//! ```

#![warn(missing_docs)]

mod component;
mod error;
mod value;

pub use component::{
    ClassSpec, ComponentTable, ConstructorFn, ConstructorSpec, MethodFn, MethodSpec,
};
pub use error::NativeError;
pub use value::{Instance, ParamType, Value};

/// Symbol a loadable shared library must export to hand the host its
/// component table. Signature: `extern "C" fn() -> *mut ComponentTable`.
pub const COMPONENT_INIT_SYMBOL: &str = "crossbind_component_init";
