//! Exposure Set
//!
//! Insertion-ordered, duplicate-free set of expose rows. The order is kept
//! because it records which culture a block was first authored in, which
//! the collapse tie-break depends on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{BlockKey, ExposeEntry, VariationAxis, Variant};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureSet {
    entries: Vec<ExposeEntry>,
}

impl ExposureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps decoded rows as-is. Duplicates are left for the validator to report.
    pub fn from_entries(entries: Vec<ExposeEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExposeEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, entry: &ExposeEntry) -> bool {
        self.entries.contains(entry)
    }

    /// Adds a row. Returns false if it was already present.
    pub fn add(&mut self, entry: ExposeEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Removes the row for `key` at exactly `variant`.
    pub fn remove(&mut self, key: BlockKey, variant: &Variant) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.content_key == key && e.culture == variant.culture && e.segment == variant.segment));
        self.entries.len() != before
    }

    /// Removes every row for `key`, returning how many went.
    pub fn remove_key(&mut self, key: BlockKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.content_key != key);
        before - self.entries.len()
    }

    pub fn retain(&mut self, keep: impl FnMut(&ExposeEntry) -> bool) {
        self.entries.retain(keep);
    }

    pub fn for_key(&self, key: BlockKey) -> impl Iterator<Item = &ExposeEntry> {
        self.entries.iter().filter(move |e| e.content_key == key)
    }

    pub fn is_exposed(&self, key: BlockKey) -> bool {
        self.entries.iter().any(|e| e.content_key == key)
    }

    /// Distinct content keys with at least one row.
    pub fn keys(&self) -> BTreeSet<BlockKey> {
        self.entries.iter().map(|e| e.content_key).collect()
    }

    /// Distinct non-null values on `axis` exposed for `key`, earliest row first.
    pub fn axis_values_for(&self, key: BlockKey, axis: VariationAxis) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for entry in self.for_key(key) {
            if let Some(value) = entry.axis(axis) {
                if !seen.iter().any(|s| s == value) {
                    seen.push(value.to_string());
                }
            }
        }
        seen
    }

    /// Adds one row per value for every row that is null on `axis`,
    /// keeping the other axis. A null culture row is replaced; a null
    /// segment row stays as the default segment. Returns the number of
    /// null rows expanded.
    pub fn expand_axis(&mut self, axis: VariationAxis, values: &[String]) -> usize {
        let mut expanded = 0;
        let mut next = ExposureSet::new();
        for entry in self.entries.drain(..) {
            if entry.axis(axis).is_some() {
                next.add(entry);
                continue;
            }
            expanded += 1;
            let base = entry.variant();
            if axis == VariationAxis::Segment {
                next.add(entry.clone());
            }
            for value in values {
                next.add(ExposeEntry::at(entry.content_key, &base.with(axis, Some(value))));
            }
        }
        *self = next;
        expanded
    }

    /// Nulls `axis` on every row and merges rows that become identical.
    /// Returns the number of rows removed by the merge.
    pub fn collapse_axis(&mut self, axis: VariationAxis) -> usize {
        let before = self.entries.len();
        let mut next = ExposureSet::new();
        for entry in self.entries.drain(..) {
            let base = entry.variant();
            next.add(ExposeEntry::at(entry.content_key, &base.with(axis, None)));
        }
        *self = next;
        before - self.entries.len()
    }

    /// First duplicated row, if any.
    pub fn first_duplicate(&self) -> Option<&ExposeEntry> {
        let mut seen = std::collections::HashSet::with_capacity(self.entries.len());
        self.entries.iter().find(|e| !seen.insert(*e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cultures() -> Vec<String> {
        vec!["en-US".to_string(), "da-DK".to_string()]
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let key = BlockKey::new_v4();
        let mut set = ExposureSet::new();
        assert!(set.add(ExposeEntry::new(key, Some("en-US"), None)));
        assert!(!set.add(ExposeEntry::new(key, Some("en-US"), None)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_expand_replaces_null_culture_rows() {
        let a = BlockKey::new_v4();
        let b = BlockKey::new_v4();
        let mut set = ExposureSet::new();
        set.add(ExposeEntry::new(a, None, Some("vip")));
        set.add(ExposeEntry::new(b, Some("en-US"), None));

        assert_eq!(set.expand_axis(VariationAxis::Culture, &cultures()), 1);
        let rows: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            rows,
            vec![
                ExposeEntry::new(a, Some("en-US"), Some("vip")),
                ExposeEntry::new(a, Some("da-DK"), Some("vip")),
                ExposeEntry::new(b, Some("en-US"), None),
            ]
        );
    }

    #[test]
    fn test_expand_segments_keeps_default_segment_row() {
        let key = BlockKey::new_v4();
        let mut set = ExposureSet::new();
        set.add(ExposeEntry::new(key, Some("en-US"), None));

        let segments = vec!["vip".to_string()];
        assert_eq!(set.expand_axis(VariationAxis::Segment, &segments), 1);
        let rows: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            rows,
            vec![
                ExposeEntry::new(key, Some("en-US"), None),
                ExposeEntry::new(key, Some("en-US"), Some("vip")),
            ]
        );
    }

    #[test]
    fn test_collapse_merges_per_key_and_segment() {
        let key = BlockKey::new_v4();
        let mut set = ExposureSet::new();
        set.add(ExposeEntry::new(key, Some("en-US"), None));
        set.add(ExposeEntry::new(key, Some("da-DK"), None));
        set.add(ExposeEntry::new(key, Some("da-DK"), Some("vip")));

        assert_eq!(set.collapse_axis(VariationAxis::Culture), 1);
        let rows: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            rows,
            vec![ExposeEntry::new(key, None, None), ExposeEntry::new(key, None, Some("vip"))]
        );
    }

    #[test]
    fn test_axis_values_in_row_order() {
        let key = BlockKey::new_v4();
        let mut set = ExposureSet::new();
        set.add(ExposeEntry::new(key, Some("da-DK"), None));
        set.add(ExposeEntry::new(BlockKey::new_v4(), Some("fr-FR"), None));
        set.add(ExposeEntry::new(key, Some("en-US"), None));
        assert_eq!(set.axis_values_for(key, VariationAxis::Culture), vec!["da-DK", "en-US"]);
    }

    #[test]
    fn test_first_duplicate_in_decoded_rows() {
        let key = BlockKey::new_v4();
        let set = ExposureSet::from_entries(vec![
            ExposeEntry::new(key, None, None),
            ExposeEntry::new(key, None, None),
        ]);
        assert_eq!(set.first_duplicate(), Some(&ExposeEntry::new(key, None, None)));
    }
}
