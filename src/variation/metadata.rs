//! Content-type variation metadata
//!
//! The element types a block record conforms to are owned elsewhere. This
//! crate only asks whether a type (or one of its properties) varies by
//! culture or segment.

use std::collections::{HashMap, HashSet};

use crate::model::{BlockError, BlockResult, ContentTypeKey, Variant};

/// Capability query over element-type variation.
pub trait VariationMetadata {
    fn varies_by_culture(&self, content_type_key: ContentTypeKey) -> bool;

    fn varies_by_segment(&self, content_type_key: ContentTypeKey) -> bool;

    /// Defaults to the type-level answer.
    fn property_varies_by_culture(&self, content_type_key: ContentTypeKey, _property_alias: &str) -> bool {
        self.varies_by_culture(content_type_key)
    }

    /// Defaults to the type-level answer.
    fn property_varies_by_segment(&self, content_type_key: ContentTypeKey, _property_alias: &str) -> bool {
        self.varies_by_segment(content_type_key)
    }
}

/// Rejects a value coordinate the element type cannot hold.
pub fn check_value_scope(
    metadata: &dyn VariationMetadata,
    content_type_key: ContentTypeKey,
    property_alias: &str,
    variant: &Variant,
) -> BlockResult<()> {
    if let Some(culture) = &variant.culture {
        if !metadata.property_varies_by_culture(content_type_key, property_alias) {
            return Err(BlockError::culture_mismatch(
                culture.as_str(),
                format!(
                    "property '{}' of element type {} does not vary by culture",
                    property_alias, content_type_key
                ),
            ));
        }
    }
    if let Some(segment) = &variant.segment {
        if !metadata.property_varies_by_segment(content_type_key, property_alias) {
            return Err(BlockError::segment_mismatch(
                segment.as_str(),
                format!(
                    "property '{}' of element type {} does not vary by segment",
                    property_alias, content_type_key
                ),
            ));
        }
    }
    Ok(())
}

/// Variation flags of one element type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTypeVariation {
    pub varies_by_culture: bool,
    pub varies_by_segment: bool,
    /// Properties that stay invariant even though the type varies.
    pub invariant_properties: HashSet<String>,
}

impl ElementTypeVariation {
    pub fn new(varies_by_culture: bool, varies_by_segment: bool) -> Self {
        Self {
            varies_by_culture,
            varies_by_segment,
            invariant_properties: HashSet::new(),
        }
    }

    pub fn with_invariant_property(mut self, alias: impl Into<String>) -> Self {
        self.invariant_properties.insert(alias.into());
        self
    }
}

/// In-memory metadata table. Unknown types are treated as invariant.
#[derive(Debug, Clone, Default)]
pub struct StaticVariationMetadata {
    types: HashMap<ContentTypeKey, ElementTypeVariation>,
}

impl StaticVariationMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: ContentTypeKey, variation: ElementTypeVariation) {
        self.types.insert(key, variation);
    }

    /// Replaces the flags of an already registered type, e.g. after a
    /// variation toggle. Returns false if the type is unknown.
    pub fn update(&mut self, key: ContentTypeKey, varies_by_culture: bool, varies_by_segment: bool) -> bool {
        match self.types.get_mut(&key) {
            Some(entry) => {
                entry.varies_by_culture = varies_by_culture;
                entry.varies_by_segment = varies_by_segment;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: ContentTypeKey) -> Option<&ElementTypeVariation> {
        self.types.get(&key)
    }
}

impl VariationMetadata for StaticVariationMetadata {
    fn varies_by_culture(&self, key: ContentTypeKey) -> bool {
        self.types.get(&key).map_or(false, |t| t.varies_by_culture)
    }

    fn varies_by_segment(&self, key: ContentTypeKey) -> bool {
        self.types.get(&key).map_or(false, |t| t.varies_by_segment)
    }

    fn property_varies_by_culture(&self, key: ContentTypeKey, alias: &str) -> bool {
        self.types
            .get(&key)
            .map_or(false, |t| t.varies_by_culture && !t.invariant_properties.contains(alias))
    }

    fn property_varies_by_segment(&self, key: ContentTypeKey, alias: &str) -> bool {
        self.types
            .get(&key)
            .map_or(false, |t| t.varies_by_segment && !t.invariant_properties.contains(alias))
    }
}
