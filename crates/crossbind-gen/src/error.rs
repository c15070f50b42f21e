//! Generation error types.
//!
//! Any of these aborts the whole generation run; no partial output is
//! ever written.

use crossbind_descriptor::DescriptorError;
use thiserror::Error;

/// Errors that can occur during a generation run.
#[derive(Debug, Error)]
pub enum GenError {
    /// Catalog could not be loaded or failed validation
    #[error("{0}")]
    Descriptor(#[from] DescriptorError),

    /// A descriptor misses metadata the generator requires
    #[error("Missing generation metadata for '{class}': {detail}")]
    MetadataMissing {
        /// Class being generated
        class: String,
        /// What was missing
        detail: String,
    },

    /// A raw type has no mapping at the adapter/facade boundary
    #[error("Unmappable type '{ty}' in class '{class}'")]
    UnmappableType {
        /// Class being generated
        class: String,
        /// Offending raw type
        ty: String,
    },

    /// Writing generated output failed
    #[error("Generation I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
