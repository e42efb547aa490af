//! Arena of block records addressed by key
//!
//! Records live in a vector (so serialized order is stable) with a
//! key → slot index next to it. Every lookup goes through the index.

use std::collections::HashMap;

use serde_json::Value;

use crate::model::{
    BlockError, BlockItemData, BlockKey, BlockResult, ReferenceOrigin, ScopedValue, StoreKind, Variant,
};
use crate::variation::{check_value_scope, VariationMetadata};

/// Content or settings records of one block value.
#[derive(Debug, Clone)]
pub struct RecordStore {
    kind: StoreKind,
    records: Vec<BlockItemData>,
    index: HashMap<BlockKey, usize>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a store from decoded records.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if two records share a key, `DuplicateScope` if a
    /// record holds two values for the same (alias, culture, segment).
    pub fn from_records(kind: StoreKind, records: Vec<BlockItemData>) -> BlockResult<Self> {
        let mut store = Self::new(kind);
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: BlockKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn record(&self, key: BlockKey) -> Option<&BlockItemData> {
        self.index.get(&key).map(|&slot| &self.records[slot])
    }

    pub(crate) fn record_mut(&mut self, key: BlockKey) -> Option<&mut BlockItemData> {
        match self.index.get(&key) {
            Some(&slot) => Some(&mut self.records[slot]),
            None => None,
        }
    }

    pub fn records(&self) -> &[BlockItemData] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.records.iter().map(|r| r.key)
    }

    /// Adds a new record.
    pub fn insert(&mut self, record: BlockItemData) -> BlockResult<()> {
        if self.index.contains_key(&record.key) {
            return Err(BlockError::DuplicateKey {
                key: record.key,
                store: self.kind,
            });
        }
        record.check_unique_scopes()?;

        self.index.insert(record.key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Reads a property value with fallback.
    ///
    /// Lookup order: exact (culture, segment), then (culture, null), then
    /// (null, segment), then (null, null). Absent if none match or the
    /// record does not exist.
    pub fn get(
        &self,
        key: BlockKey,
        property_alias: &str,
        culture: Option<&str>,
        segment: Option<&str>,
    ) -> Option<&Value> {
        let record = self.record(key)?;
        Variant::new(culture, segment)
            .fallback_chain()
            .iter()
            .find_map(|variant| record.find(property_alias, variant))
            .map(|scoped| &scoped.value)
    }

    /// Writes a property value at an exact coordinate.
    ///
    /// A non-null culture (or segment) is only accepted when the element
    /// type's property varies on that axis. The value is never coerced to
    /// null; a mismatch is rejected.
    pub fn set(
        &mut self,
        key: BlockKey,
        property_alias: &str,
        culture: Option<&str>,
        segment: Option<&str>,
        value: Value,
        metadata: &dyn VariationMetadata,
    ) -> BlockResult<()> {
        let kind = self.kind;
        let record = self.record_mut(key).ok_or(BlockError::DanglingReference {
            key,
            origin: ReferenceOrigin::Store(kind),
        })?;

        let variant = Variant::new(culture, segment);
        check_value_scope(metadata, record.content_type_key, property_alias, &variant)?;

        match record.find_mut(property_alias, &variant) {
            Some(existing) => existing.value = value,
            None => record.values.push(ScopedValue::new(property_alias, &variant, value)),
        }
        Ok(())
    }

    /// Removes a record and all of its values.
    pub fn delete(&mut self, key: BlockKey) -> Option<BlockItemData> {
        let slot = self.index.remove(&key)?;
        let record = self.records.remove(slot);
        for idx in self.index.values_mut() {
            if *idx > slot {
                *idx -= 1;
            }
        }
        Some(record)
    }

    /// Keeps only records for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&BlockItemData) -> bool) {
        self.records.retain(|r| keep(r));
        self.reindex();
    }

    /// Applies `f` to every record in place.
    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut BlockItemData)) {
        for record in &mut self.records {
            f(record);
        }
    }

    pub fn into_records(self) -> Vec<BlockItemData> {
        self.records
    }

    fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(slot, r)| (r.key, slot))
            .collect();
    }
}

/// Record order carries no meaning, so equality is by key.
impl PartialEq for RecordStore {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.records.len() == other.records.len()
            && self
                .records
                .iter()
                .all(|r| other.record(r.key).map_or(false, |o| o == r))
    }
}
