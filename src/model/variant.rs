//! Culture × segment coordinates
//!
//! `None` on an axis means invariant on that axis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two variation axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationAxis {
    Culture,
    Segment,
}

impl VariationAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationAxis::Culture => "culture",
            VariationAxis::Segment => "segment",
        }
    }

    /// The other axis.
    pub fn other(&self) -> VariationAxis {
        match self {
            VariationAxis::Culture => VariationAxis::Segment,
            VariationAxis::Segment => VariationAxis::Culture,
        }
    }
}

impl fmt::Display for VariationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (culture, segment) coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variant {
    pub culture: Option<String>,
    pub segment: Option<String>,
}

impl Variant {
    pub fn new(culture: Option<&str>, segment: Option<&str>) -> Self {
        Self {
            culture: culture.map(str::to_string),
            segment: segment.map(str::to_string),
        }
    }

    /// The fully invariant coordinate `(null, null)`.
    pub fn invariant() -> Self {
        Self::default()
    }

    pub fn culture(culture: &str) -> Self {
        Self::new(Some(culture), None)
    }

    pub fn get(&self, axis: VariationAxis) -> Option<&str> {
        match axis {
            VariationAxis::Culture => self.culture.as_deref(),
            VariationAxis::Segment => self.segment.as_deref(),
        }
    }

    pub fn with(&self, axis: VariationAxis, value: Option<&str>) -> Self {
        let mut next = self.clone();
        let slot = match axis {
            VariationAxis::Culture => &mut next.culture,
            VariationAxis::Segment => &mut next.segment,
        };
        *slot = value.map(str::to_string);
        next
    }

    /// Fallback chain used for reads: exact, (culture, null), (null, segment), (null, null).
    ///
    /// Duplicates are skipped so each coordinate is visited once.
    pub fn fallback_chain(&self) -> Vec<Variant> {
        let candidates = [
            self.clone(),
            Variant {
                culture: self.culture.clone(),
                segment: None,
            },
            Variant {
                culture: None,
                segment: self.segment.clone(),
            },
            Variant::invariant(),
        ];

        let mut chain: Vec<Variant> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            self.culture.as_deref().unwrap_or("null"),
            self.segment.as_deref().unwrap_or("null")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_chain_full() {
        let chain = Variant::new(Some("en-US"), Some("vip")).fallback_chain();
        assert_eq!(
            chain,
            vec![
                Variant::new(Some("en-US"), Some("vip")),
                Variant::new(Some("en-US"), None),
                Variant::new(None, Some("vip")),
                Variant::invariant(),
            ]
        );
    }

    #[test]
    fn test_fallback_chain_collapses_duplicates() {
        let chain = Variant::culture("da-DK").fallback_chain();
        assert_eq!(chain, vec![Variant::culture("da-DK"), Variant::invariant()]);

        assert_eq!(Variant::invariant().fallback_chain(), vec![Variant::invariant()]);
    }

    #[test]
    fn test_with_replaces_one_axis() {
        let v = Variant::new(Some("en-US"), Some("vip")).with(VariationAxis::Culture, None);
        assert_eq!(v, Variant::new(None, Some("vip")));
    }
}
