//! Cultures named by a publish request

use std::collections::BTreeSet;

/// Sentinel for "the single invariant culture".
pub const INVARIANT_CULTURE: &str = "*";

/// Set of culture codes being published, possibly including the
/// invariant sentinel.
///
/// Null-culture (invariant) data always matches, whatever the set holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishCultures {
    cultures: BTreeSet<String>,
    invariant: bool,
}

impl PublishCultures {
    /// The set `{"*"}`.
    pub fn invariant() -> Self {
        Self {
            cultures: BTreeSet::new(),
            invariant: true,
        }
    }

    /// Parses a comma-separated list such as `en-US,da-DK` or `*`.
    /// Blank entries are skipped.
    pub fn parse(list: &str) -> Self {
        list.split(',').map(str::trim).filter(|c| !c.is_empty()).collect()
    }

    pub fn insert(&mut self, culture: &str) {
        if culture == INVARIANT_CULTURE {
            self.invariant = true;
        } else {
            self.cultures.insert(culture.to_string());
        }
    }

    /// Whether data at `culture` is published by this request.
    pub fn matches(&self, culture: Option<&str>) -> bool {
        match culture {
            None => true,
            Some(code) => self.cultures.contains(code),
        }
    }

    pub fn includes_invariant(&self) -> bool {
        self.invariant
    }

    /// Explicit culture codes, sentinel excluded.
    pub fn cultures(&self) -> impl Iterator<Item = &str> {
        self.cultures.iter().map(String::as_str)
    }

    pub fn is_subset(&self, other: &PublishCultures) -> bool {
        (!self.invariant || other.invariant) && self.cultures.is_subset(&other.cultures)
    }

    pub fn is_empty(&self) -> bool {
        !self.invariant && self.cultures.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PublishCultures {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PublishCultures::default();
        for culture in iter {
            set.insert(culture.as_ref());
        }
        set
    }
}
