//! Layout items, keyed by the editor that owns their shape
//!
//! Every layout item carries the same header (`contentKey`, optional
//! `settingsKey`). What else it carries depends on the editor alias it is
//! listed under, so the payload is a tagged variant rather than a loose map.
//! Custom editors keep their extra fields verbatim.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{BlockError, BlockResult};
use super::keys::BlockKey;

pub const BLOCK_LIST_ALIAS: &str = "Umbraco.BlockList";
pub const BLOCK_GRID_ALIAS: &str = "Umbraco.BlockGrid";
pub const RICH_TEXT_ALIAS: &str = "Umbraco.RichText";

/// Property editor alias a layout list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditorAlias {
    BlockList,
    BlockGrid,
    RichText,
    Custom(String),
}

impl EditorAlias {
    pub fn parse(alias: &str) -> Self {
        match alias {
            BLOCK_LIST_ALIAS => EditorAlias::BlockList,
            BLOCK_GRID_ALIAS => EditorAlias::BlockGrid,
            RICH_TEXT_ALIAS => EditorAlias::RichText,
            other => EditorAlias::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EditorAlias::BlockList => BLOCK_LIST_ALIAS,
            EditorAlias::BlockGrid => BLOCK_GRID_ALIAS,
            EditorAlias::RichText => RICH_TEXT_ALIAS,
            EditorAlias::Custom(alias) => alias,
        }
    }
}

impl fmt::Display for EditorAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EditorAlias {
    fn from(alias: &str) -> Self {
        EditorAlias::parse(alias)
    }
}

/// A named area inside a grid block, holding nested grid items.
#[derive(Debug, Clone, PartialEq)]
pub struct GridArea {
    pub key: Uuid,
    pub items: Vec<LayoutItem>,
}

/// Editor-specific part of a layout item.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutPayload {
    List,
    Grid {
        column_span: Option<u32>,
        row_span: Option<u32>,
        areas: Vec<GridArea>,
    },
    RichText {
        display_inline: bool,
    },
    Custom(Map<String, Value>),
}

/// One placement of a block in a layout list.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub content_key: BlockKey,
    pub settings_key: Option<BlockKey>,
    pub payload: LayoutPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHeader {
    content_key: BlockKey,
    #[serde(default)]
    settings_key: Option<BlockKey>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGrid {
    #[serde(default)]
    column_span: Option<u32>,
    #[serde(default)]
    row_span: Option<u32>,
    #[serde(default)]
    areas: Vec<RawArea>,
}

#[derive(Deserialize)]
struct RawArea {
    key: Uuid,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRichText {
    #[serde(default)]
    display_inline: bool,
}

impl LayoutItem {
    pub fn list(content_key: BlockKey, settings_key: Option<BlockKey>) -> Self {
        Self {
            content_key,
            settings_key,
            payload: LayoutPayload::List,
        }
    }

    pub fn grid(content_key: BlockKey, settings_key: Option<BlockKey>, column_span: u32, row_span: u32) -> Self {
        Self {
            content_key,
            settings_key,
            payload: LayoutPayload::Grid {
                column_span: Some(column_span),
                row_span: Some(row_span),
                areas: Vec::new(),
            },
        }
    }

    pub fn rich_text(content_key: BlockKey, settings_key: Option<BlockKey>, display_inline: bool) -> Self {
        Self {
            content_key,
            settings_key,
            payload: LayoutPayload::RichText { display_inline },
        }
    }

    /// Adds a nested area to a grid item. No-op for other payloads.
    pub fn with_area(mut self, key: Uuid, items: Vec<LayoutItem>) -> Self {
        if let LayoutPayload::Grid { areas, .. } = &mut self.payload {
            areas.push(GridArea { key, items });
        }
        self
    }

    /// Nested items, if this payload has any.
    pub fn children(&self) -> impl Iterator<Item = &LayoutItem> {
        let areas: &[GridArea] = match &self.payload {
            LayoutPayload::Grid { areas, .. } => areas,
            _ => &[],
        };
        areas.iter().flat_map(|a| a.items.iter())
    }

    /// Depth-first walk over this item and every nested item.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a LayoutItem)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Mutable access to nested areas.
    pub fn areas_mut(&mut self) -> Option<&mut Vec<GridArea>> {
        match &mut self.payload {
            LayoutPayload::Grid { areas, .. } => Some(areas),
            _ => None,
        }
    }

    /// Decodes an item listed under `editor`.
    pub fn from_json(editor: &EditorAlias, value: Value) -> BlockResult<Self> {
        let header: RawHeader = serde_json::from_value(value.clone())?;

        let payload = match editor {
            EditorAlias::BlockList => LayoutPayload::List,
            EditorAlias::RichText => {
                let raw: RawRichText = serde_json::from_value(value)?;
                LayoutPayload::RichText {
                    display_inline: raw.display_inline,
                }
            }
            EditorAlias::BlockGrid => {
                let raw: RawGrid = serde_json::from_value(value)?;
                let areas = raw
                    .areas
                    .into_iter()
                    .map(|area| {
                        let items = area
                            .items
                            .into_iter()
                            .map(|item| LayoutItem::from_json(editor, item))
                            .collect::<BlockResult<Vec<_>>>()?;
                        Ok(GridArea { key: area.key, items })
                    })
                    .collect::<BlockResult<Vec<_>>>()?;
                LayoutPayload::Grid {
                    column_span: raw.column_span,
                    row_span: raw.row_span,
                    areas,
                }
            }
            EditorAlias::Custom(_) => {
                let mut fields = match value {
                    Value::Object(map) => map,
                    other => {
                        return Err(BlockError::Malformed(format!(
                            "layout item must be an object, got {}",
                            other
                        )))
                    }
                };
                fields.remove("contentKey");
                fields.remove("settingsKey");
                LayoutPayload::Custom(fields)
            }
        };

        Ok(Self {
            content_key: header.content_key,
            settings_key: header.settings_key,
            payload,
        })
    }

    /// Encodes the item as a flat JSON object (header fields first).
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("contentKey".into(), Value::String(self.content_key.to_string()));
        if let Some(settings_key) = self.settings_key {
            out.insert("settingsKey".into(), Value::String(settings_key.to_string()));
        }

        match &self.payload {
            LayoutPayload::List => {}
            LayoutPayload::RichText { display_inline } => {
                out.insert("displayInline".into(), Value::Bool(*display_inline));
            }
            LayoutPayload::Grid {
                column_span,
                row_span,
                areas,
            } => {
                if let Some(span) = column_span {
                    out.insert("columnSpan".into(), Value::from(*span));
                }
                if let Some(span) = row_span {
                    out.insert("rowSpan".into(), Value::from(*span));
                }
                let areas = areas
                    .iter()
                    .map(|area| {
                        let mut a = Map::new();
                        a.insert("key".into(), Value::String(area.key.to_string()));
                        a.insert(
                            "items".into(),
                            Value::Array(area.items.iter().map(LayoutItem::to_json).collect()),
                        );
                        Value::Object(a)
                    })
                    .collect();
                out.insert("areas".into(), Value::Array(areas));
            }
            LayoutPayload::Custom(fields) => {
                for (k, v) in fields {
                    out.insert(k.clone(), v.clone());
                }
            }
        }

        Value::Object(out)
    }
}

/// Layout lists per editor alias. Order inside each list is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    lists: BTreeMap<EditorAlias, Vec<LayoutItem>>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, editor: &EditorAlias) -> Option<&[LayoutItem]> {
        self.lists.get(editor).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, editor: &EditorAlias) -> Option<&mut Vec<LayoutItem>> {
        self.lists.get_mut(editor)
    }

    /// The list for `editor`, created empty if absent.
    pub fn list_mut(&mut self, editor: &EditorAlias) -> &mut Vec<LayoutItem> {
        self.lists.entry(editor.clone()).or_default()
    }

    pub fn editors(&self) -> impl Iterator<Item = &EditorAlias> {
        self.lists.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EditorAlias, &Vec<LayoutItem>)> {
        self.lists.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EditorAlias, &mut Vec<LayoutItem>)> {
        self.lists.iter_mut()
    }

    /// Every item, nested ones included, with the editor it sits under.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a EditorAlias, &'a LayoutItem)) {
        for (editor, items) in &self.lists {
            for item in items {
                item.walk(&mut |i| visit(editor, i));
            }
        }
    }

    /// True if any item anywhere references `key` as its content.
    pub fn references_content(&self, key: BlockKey) -> bool {
        let mut found = false;
        self.walk(&mut |_, item| found |= item.content_key == key);
        found
    }

    /// True if any item anywhere references `key` as its settings.
    pub fn references_settings(&self, key: BlockKey) -> bool {
        let mut found = false;
        self.walk(&mut |_, item| found |= item.settings_key == Some(key));
        found
    }

    pub fn is_empty(&self) -> bool {
        self.lists.values().all(Vec::is_empty)
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lists.len()))?;
        for (editor, items) in &self.lists {
            let items: Vec<Value> = items.iter().map(LayoutItem::to_json).collect();
            map.serialize_entry(editor.as_str(), &items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<Value>>::deserialize(deserializer)?;
        let mut lists = BTreeMap::new();
        for (alias, items) in raw {
            let editor = EditorAlias::parse(&alias);
            let items = items
                .into_iter()
                .map(|item| LayoutItem::from_json(&editor, item))
                .collect::<BlockResult<Vec<_>>>()
                .map_err(D::Error::custom)?;
            lists.insert(editor, items);
        }
        Ok(Self { lists })
    }
}
