//! Class descriptor catalog
//!
//! Declarative metadata for every class the runtime exposes across the
//! component boundary: identity, construction policy, constructors,
//! fields, and methods. One TOML document per class; a [`Catalog`] is the
//! loaded, validated set the generator consumes.

#![warn(missing_docs)]

mod catalog;
mod descriptor;

pub use catalog::Catalog;
pub use descriptor::{
    ClassDescriptor, ClassKind, ConstructionPolicy, DescriptorError, FieldDescriptor,
    MemberDescriptor, ParamDescriptor,
};
