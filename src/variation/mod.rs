//! Variation subsystem
//!
//! - Element-type variation metadata (consumed, not owned)
//! - Variation of the owning content property
//! - Cultures/segments configured on the content item
//! - The Exposure Set

mod exposure;
mod metadata;
mod owner;

pub use exposure::ExposureSet;
pub use metadata::{check_value_scope, ElementTypeVariation, StaticVariationMetadata, VariationMetadata};
pub use owner::{PropertyVariation, VariationConfig};
