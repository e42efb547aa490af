//! Block records and their scoped property values

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{BlockError, BlockResult};
use super::keys::{BlockKey, ContentTypeKey};
use super::variant::{VariationAxis, Variant};

/// Which of the two record stores a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Content,
    Settings,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Content => write!(f, "content"),
            StoreKind::Settings => write!(f, "settings"),
        }
    }
}

/// One property value for one (culture, segment) coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedValue {
    pub property_alias: String,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    pub value: Value,
}

impl ScopedValue {
    pub fn new(property_alias: impl Into<String>, variant: &Variant, value: Value) -> Self {
        Self {
            property_alias: property_alias.into(),
            culture: variant.culture.clone(),
            segment: variant.segment.clone(),
            value,
        }
    }

    /// Invariant value, `(null, null)`.
    pub fn invariant(property_alias: impl Into<String>, value: Value) -> Self {
        Self::new(property_alias, &Variant::invariant(), value)
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

    fn matches(&self, property_alias: &str, variant: &Variant) -> bool {
        self.property_alias == property_alias
            && self.culture == variant.culture
            && self.segment == variant.segment
    }
}

/// A content or settings record of one block instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockItemData {
    pub key: BlockKey,
    pub content_type_key: ContentTypeKey,
    #[serde(default)]
    pub content_type_alias: String,
    #[serde(default)]
    pub values: Vec<ScopedValue>,
}

impl BlockItemData {
    pub fn new(key: BlockKey, content_type_key: ContentTypeKey, content_type_alias: impl Into<String>) -> Self {
        Self {
            key,
            content_type_key,
            content_type_alias: content_type_alias.into(),
            values: Vec::new(),
        }
    }

    /// Builder-style value append, used when assembling a new record.
    pub fn with_value(mut self, value: ScopedValue) -> Self {
        self.values.push(value);
        self
    }

    /// Exact-coordinate lookup, no fallback.
    pub fn find(&self, property_alias: &str, variant: &Variant) -> Option<&ScopedValue> {
        self.values.iter().find(|v| v.matches(property_alias, variant))
    }

    pub(crate) fn find_mut(&mut self, property_alias: &str, variant: &Variant) -> Option<&mut ScopedValue> {
        self.values.iter_mut().find(|v| v.matches(property_alias, variant))
    }

    /// Distinct non-null values on an axis, in order of first appearance.
    pub fn axis_values(&self, axis: VariationAxis) -> Vec<String> {
        let mut seen = Vec::new();
        for v in &self.values {
            if let Some(c) = v.axis(axis) {
                if !seen.iter().any(|s: &String| s == c) {
                    seen.push(c.to_string());
                }
            }
        }
        seen
    }

    /// At most one value per (propertyAlias, culture, segment).
    pub fn check_unique_scopes(&self) -> BlockResult<()> {
        let mut seen = HashSet::with_capacity(self.values.len());
        for v in &self.values {
            let triple = (v.property_alias.as_str(), v.culture.as_deref(), v.segment.as_deref());
            if !seen.insert(triple) {
                return Err(BlockError::DuplicateScope {
                    key: self.key,
                    property_alias: v.property_alias.clone(),
                    culture: v.culture.clone(),
                    segment: v.segment.clone(),
                });
            }
        }
        Ok(())
    }
}
