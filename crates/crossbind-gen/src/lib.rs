//! Crossbind generator
//!
//! Turns a descriptor catalog into the adapter/facade source pairs the
//! runtime forwards through. Generation is all-or-nothing: every unit
//! renders in memory before anything is written, and the output tree is
//! split into an `adapter/` and a `facade/` module the consuming crate
//! mounts side by side.

mod adapter;
mod builder;
mod error;
mod facade;
mod generator;
mod rules;

pub use adapter::{constructor_key, AdapterGenerator};
pub use builder::SourceBuilder;
pub use error::GenError;
pub use facade::{expand_placeholders, FacadeGenerator};
pub use generator::{generate_dir, render_catalog, GenerateSummary, GeneratedUnit};
pub use rules::{adapter_name, facade_stem, TransformRules};
