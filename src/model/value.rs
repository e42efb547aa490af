//! The persisted block property value
//!
//! Wire shape (field names are the contract):
//!
//! ```json
//! {
//!   "layout": { "<editor alias>": [ { "contentKey": "...", "settingsKey": "..." } ] },
//!   "contentData": [ { "key": "...", "contentTypeKey": "...", "values": [] } ],
//!   "settingsData": [],
//!   "expose": [ { "contentKey": "...", "culture": null, "segment": null } ]
//! }
//! ```
//!
//! Order within a layout list is display order. Order of `contentData` and
//! `settingsData` carries no meaning.

use serde::{Deserialize, Serialize};

use super::errors::{BlockError, BlockResult};
use super::expose::ExposeEntry;
use super::layout::Layout;
use super::record::{BlockItemData, StoreKind};
use crate::store::RecordStore;
use crate::variation::ExposureSet;

/// One block-valued property, as authored (the draft).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlockValueWire", into = "BlockValueWire")]
pub struct BlockValue {
    pub layout: Layout,
    pub content: RecordStore,
    pub settings: RecordStore,
    pub expose: ExposureSet,
}

/// Serialized form of [`BlockValue`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockValueWire {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub content_data: Vec<BlockItemData>,
    #[serde(default)]
    pub settings_data: Vec<BlockItemData>,
    #[serde(default)]
    pub expose: Vec<ExposeEntry>,
}

impl TryFrom<BlockValueWire> for BlockValue {
    type Error = BlockError;

    fn try_from(wire: BlockValueWire) -> BlockResult<Self> {
        Ok(Self {
            layout: wire.layout,
            content: RecordStore::from_records(StoreKind::Content, wire.content_data)?,
            settings: RecordStore::from_records(StoreKind::Settings, wire.settings_data)?,
            expose: ExposureSet::from_entries(wire.expose),
        })
    }
}

impl From<BlockValue> for BlockValueWire {
    fn from(value: BlockValue) -> Self {
        Self {
            layout: value.layout,
            content_data: value.content.into_records(),
            settings_data: value.settings.into_records(),
            expose: value.expose.iter().cloned().collect(),
        }
    }
}

impl Default for BlockValue {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockValue {
    pub fn new() -> Self {
        Self {
            layout: Layout::new(),
            content: RecordStore::new(StoreKind::Content),
            settings: RecordStore::new(StoreKind::Settings),
            expose: ExposureSet::new(),
        }
    }

    /// Decodes the stored string form.
    ///
    /// Only structural decoding happens here (duplicate keys and scopes are
    /// caught). Cross-references are checked by the integrity validator.
    pub fn from_json(json: &str) -> BlockResult<Self> {
        let wire: BlockValueWire = serde_json::from_str(json)?;
        Self::try_from(wire)
    }

    pub fn from_json_value(value: serde_json::Value) -> BlockResult<Self> {
        let wire: BlockValueWire = serde_json::from_value(value)?;
        Self::try_from(wire)
    }

    pub fn to_json(&self) -> BlockResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_value(&self) -> BlockResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn store(&self, kind: StoreKind) -> &RecordStore {
        match kind {
            StoreKind::Content => &self.content,
            StoreKind::Settings => &self.settings,
        }
    }

    pub fn store_mut(&mut self, kind: StoreKind) -> &mut RecordStore {
        match kind {
            StoreKind::Content => &mut self.content,
            StoreKind::Settings => &mut self.settings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty() && self.content.is_empty() && self.settings.is_empty() && self.expose.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKey, ContentTypeKey, EditorAlias, LayoutItem, ScopedValue};
    use serde_json::json;

    #[test]
    fn test_decode_wire_shape() {
        let content = BlockKey::new_v4();
        let settings = BlockKey::new_v4();
        let type_key = ContentTypeKey::new_v4();
        let raw = json!({
            "layout": {
                "Umbraco.BlockList": [ { "contentKey": content.to_string(), "settingsKey": settings.to_string() } ]
            },
            "contentData": [ {
                "key": content.to_string(),
                "contentTypeKey": type_key.to_string(),
                "contentTypeAlias": "headline",
                "values": [ { "propertyAlias": "title", "culture": "en-US", "segment": null, "value": "Hello" } ]
            } ],
            "settingsData": [ { "key": settings.to_string(), "contentTypeKey": type_key.to_string(), "values": [] } ],
            "expose": [ { "contentKey": content.to_string(), "culture": "en-US", "segment": null } ]
        });

        let value = BlockValue::from_json_value(raw).unwrap();
        assert_eq!(value.layout.get(&EditorAlias::BlockList).unwrap().len(), 1);
        assert_eq!(value.content.get(content, "title", Some("en-US"), None), Some(&json!("Hello")));
        assert!(value.settings.contains(settings));
        assert_eq!(value.expose.len(), 1);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let value = BlockValue::from_json("{}").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_encode_uses_wire_names() {
        let key = BlockKey::new_v4();
        let mut value = BlockValue::new();
        value.layout.list_mut(&EditorAlias::BlockList).push(LayoutItem::list(key, None));
        value
            .content
            .insert(BlockItemData::new(key, ContentTypeKey::new_v4(), "t").with_value(ScopedValue::invariant("a", json!(1))))
            .unwrap();

        let json = value.to_json_value().unwrap();
        for field in ["layout", "contentData", "settingsData", "expose"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        let back = BlockValue::from_json_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_duplicate_record_key_rejected_on_decode() {
        let key = BlockKey::new_v4().to_string();
        let type_key = ContentTypeKey::new_v4().to_string();
        let raw = json!({
            "contentData": [
                { "key": key, "contentTypeKey": type_key },
                { "key": key, "contentTypeKey": type_key }
            ]
        });
        let err = BlockValue::from_json_value(raw).unwrap_err();
        assert!(matches!(err, BlockError::DuplicateKey { .. }));
    }
}
