//! Variation of the owning content property and the editing context

use crate::model::{BlockError, BlockResult, ExposeEntry, VariationAxis, Variant};

/// How the content property holding the block value varies.
///
/// Exposure rows follow these flags: on a varying axis they carry a value,
/// on an invariant axis they carry null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyVariation {
    pub varies_by_culture: bool,
    pub varies_by_segment: bool,
}

impl PropertyVariation {
    pub fn new(varies_by_culture: bool, varies_by_segment: bool) -> Self {
        Self {
            varies_by_culture,
            varies_by_segment,
        }
    }

    pub fn invariant() -> Self {
        Self::default()
    }

    pub fn varies_on(&self, axis: VariationAxis) -> bool {
        match axis {
            VariationAxis::Culture => self.varies_by_culture,
            VariationAxis::Segment => self.varies_by_segment,
        }
    }

    pub fn with(&self, axis: VariationAxis, varies: bool) -> Self {
        let mut next = *self;
        match axis {
            VariationAxis::Culture => next.varies_by_culture = varies,
            VariationAxis::Segment => next.varies_by_segment = varies,
        }
        next
    }

    /// The coordinate an exposure row gets when a block is inserted while
    /// editing in `context`.
    ///
    /// A varying axis takes the context's value. A varying culture axis
    /// must have one; on the segment axis null is the default segment. An
    /// invariant axis is stored as null whatever the context says.
    pub fn exposure_variant(&self, context: &Variant) -> BlockResult<Variant> {
        let mut out = Variant::invariant();
        for axis in [VariationAxis::Culture, VariationAxis::Segment] {
            if !self.varies_on(axis) {
                continue;
            }
            match context.get(axis) {
                Some(value) => out = out.with(axis, Some(value)),
                None if axis == VariationAxis::Segment => {}
                None => {
                    return Err(BlockError::VariationMismatch {
                        axis,
                        value: "null".into(),
                        reason: format!("owning property varies by {} but no {} is being edited", axis, axis),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Checks an exposure row's nullability against these flags.
    ///
    /// A null segment is always allowed: it is the default segment.
    pub fn check_exposure(&self, entry: &ExposeEntry) -> BlockResult<()> {
        for axis in [VariationAxis::Culture, VariationAxis::Segment] {
            match (self.varies_on(axis), entry.axis(axis)) {
                (false, Some(value)) => {
                    return Err(BlockError::VariationMismatch {
                        axis,
                        value: value.to_string(),
                        reason: format!(
                            "block {} is exposed per {} but the owning property does not vary by {}",
                            entry.content_key, axis, axis
                        ),
                    })
                }
                (true, None) if axis == VariationAxis::Culture => {
                    return Err(BlockError::VariationMismatch {
                        axis,
                        value: "null".into(),
                        reason: format!(
                            "block {} is exposed without a {} but the owning property varies by {}",
                            entry.content_key, axis, axis
                        ),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Cultures and segments configured on the owning content item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariationConfig {
    /// In the order they were added to the content item.
    pub cultures: Vec<String>,
    pub default_culture: Option<String>,
    pub segments: Vec<String>,
}

impl VariationConfig {
    pub fn new(cultures: &[&str]) -> Self {
        Self {
            cultures: cultures.iter().map(|c| c.to_string()).collect(),
            default_culture: None,
            segments: Vec::new(),
        }
    }

    pub fn with_default_culture(mut self, culture: &str) -> Self {
        self.default_culture = Some(culture.to_string());
        self
    }

    pub fn with_segments(mut self, segments: &[&str]) -> Self {
        self.segments = segments.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Configured values on an axis.
    pub fn values(&self, axis: VariationAxis) -> &[String] {
        match axis {
            VariationAxis::Culture => &self.cultures,
            VariationAxis::Segment => &self.segments,
        }
    }

    /// Explicit preferred value on an axis (only cultures have one).
    pub fn preferred(&self, axis: VariationAxis) -> Option<&str> {
        match axis {
            VariationAxis::Culture => self.default_culture.as_deref(),
            VariationAxis::Segment => None,
        }
    }
}
