//! Expose rows: for which (culture, segment) a block instance is active

use serde::{Deserialize, Serialize};

use super::keys::BlockKey;
use super::variant::{VariationAxis, Variant};

/// A block instance is visible for one variation coordinate.
///
/// Nullability follows the owning content property, not the block's own
/// element type: an invariant block can still be exposed per culture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposeEntry {
    pub content_key: BlockKey,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

impl ExposeEntry {
    pub fn new(content_key: BlockKey, culture: Option<&str>, segment: Option<&str>) -> Self {
        Self {
            content_key,
            culture: culture.map(str::to_string),
            segment: segment.map(str::to_string),
        }
    }

    pub fn at(content_key: BlockKey, variant: &Variant) -> Self {
        Self {
            content_key,
            culture: variant.culture.clone(),
            segment: variant.segment.clone(),
        }
    }

    pub fn variant(&self) -> Variant {
        Variant {
            culture: self.culture.clone(),
            segment: self.segment.clone(),
        }
    }

    pub fn axis(&self, axis: VariationAxis) -> Option<&str> {
        match axis {
            VariationAxis::Culture => self.culture.as_deref(),
            VariationAxis::Segment => self.segment.as_deref(),
        }
    }

    pub fn is_invariant_culture(&self) -> bool {
        self.culture.is_none()
    }
}
