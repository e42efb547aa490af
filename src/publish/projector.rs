//! Publish projection
//!
//! Produces the published view of a draft value for a set of cultures:
//! - a layout item is kept iff its content key has an expose row whose
//!   culture is null or published; nested grid items are judged on their
//!   own and go with a dropped parent
//! - kept records keep only values whose culture is null or published
//! - a settings record is kept iff a kept layout item references it
//! - a `settingsKey` without a record is dropped, never left dangling
//! - every editor alias of the draft stays present, even if its list ends
//!   up empty
//!
//! The projection never mutates the draft, never errors, and does not log.
//! Projecting a projection with the same cultures returns it unchanged.

use std::collections::HashSet;

use crate::model::{BlockKey, BlockValue, Layout, LayoutItem};
use crate::store::RecordStore;

use super::cultures::PublishCultures;

/// Stateless projector.
pub struct Projector;

impl Projector {
    /// Projects `value` for `cultures`.
    pub fn project(value: &BlockValue, cultures: &PublishCultures) -> BlockValue {
        let exposed = Self::exposed_keys(value, cultures);

        let mut layout = Layout::new();
        for (editor, items) in value.layout.iter() {
            *layout.list_mut(editor) = project_items(items, &exposed, &value.settings);
        }

        let mut content_keys = HashSet::new();
        let mut settings_keys = HashSet::new();
        layout.walk(&mut |_, item| {
            content_keys.insert(item.content_key);
            if let Some(settings_key) = item.settings_key {
                settings_keys.insert(settings_key);
            }
        });

        let content = filter_store(&value.content, &content_keys, cultures);
        let settings = filter_store(&value.settings, &settings_keys, cultures);

        let mut expose = value.expose.clone();
        expose.retain(|e| content_keys.contains(&e.content_key) && cultures.matches(e.culture.as_deref()));

        BlockValue {
            layout,
            content,
            settings,
            expose,
        }
    }

    /// Content keys with at least one expose row matching `cultures`.
    pub fn exposed_keys(value: &BlockValue, cultures: &PublishCultures) -> HashSet<BlockKey> {
        value
            .expose
            .iter()
            .filter(|e| cultures.matches(e.culture.as_deref()))
            .map(|e| e.content_key)
            .collect()
    }
}

/// Shorthand for [`Projector::project`].
pub fn project(value: &BlockValue, cultures: &PublishCultures) -> BlockValue {
    Projector::project(value, cultures)
}

fn project_items(items: &[LayoutItem], exposed: &HashSet<BlockKey>, settings: &RecordStore) -> Vec<LayoutItem> {
    items
        .iter()
        .filter(|item| exposed.contains(&item.content_key))
        .map(|item| {
            let mut item = item.clone();
            if let Some(areas) = item.areas_mut() {
                for area in areas.iter_mut() {
                    area.items = project_items(&area.items, exposed, settings);
                }
            }
            if let Some(settings_key) = item.settings_key {
                if !settings.contains(settings_key) {
                    item.settings_key = None;
                }
            }
            item
        })
        .collect()
}

fn filter_store(store: &RecordStore, keep: &HashSet<BlockKey>, cultures: &PublishCultures) -> RecordStore {
    let mut out = store.clone();
    out.retain(|record| keep.contains(&record.key));
    out.for_each_mut(|record| {
        record.values.retain(|v| cultures.matches(v.culture.as_deref()));
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockItemData, ContentTypeKey, EditorAlias, ExposeEntry, ScopedValue, Variant};
    use serde_json::json;
    use uuid::Uuid;

    fn add_block(value: &mut BlockValue, editor: &EditorAlias, cultures: &[Option<&str>]) -> BlockKey {
        let key = BlockKey::new_v4();
        let settings = BlockKey::new_v4();
        let type_key = ContentTypeKey::new_v4();
        value
            .content
            .insert(
                BlockItemData::new(key, type_key, "headline")
                    .with_value(ScopedValue::new("title", &Variant::culture("en-US"), json!("Hello")))
                    .with_value(ScopedValue::new("title", &Variant::culture("da-DK"), json!("Hej")))
                    .with_value(ScopedValue::invariant("count", json!(1))),
            )
            .unwrap();
        value.settings.insert(BlockItemData::new(settings, type_key, "headline")).unwrap();
        value.layout.append(editor, LayoutItem::list(key, Some(settings)));
        for culture in cultures {
            value.expose.add(ExposeEntry::new(key, *culture, None));
        }
        key
    }

    #[test]
    fn test_keeps_only_published_cultures() {
        let mut value = BlockValue::new();
        let en = add_block(&mut value, &EditorAlias::BlockList, &[Some("en-US")]);
        let da = add_block(&mut value, &EditorAlias::BlockList, &[Some("da-DK")]);

        let published = project(&value, &PublishCultures::parse("en-US"));
        assert!(published.layout.references_content(en));
        assert!(!published.layout.references_content(da));
        assert_eq!(published.content.len(), 1);
        assert_eq!(published.settings.len(), 1);
        assert_eq!(published.expose.len(), 1);

        let record = published.content.record(en).unwrap();
        assert!(record.find("title", &Variant::culture("da-DK")).is_none());
        assert!(record.find("title", &Variant::culture("en-US")).is_some());
        assert!(record.find("count", &Variant::invariant()).is_some());

        // Draft untouched
        assert_eq!(value.content.len(), 2);
    }

    #[test]
    fn test_invariant_exposure_always_retained() {
        let mut value = BlockValue::new();
        let key = add_block(&mut value, &EditorAlias::BlockList, &[None]);
        assert!(project(&value, &PublishCultures::invariant()).layout.references_content(key));
        assert!(project(&value, &PublishCultures::parse("da-DK")).layout.references_content(key));
    }

    #[test]
    fn test_empty_editor_list_is_kept() {
        let mut value = BlockValue::new();
        add_block(&mut value, &EditorAlias::BlockList, &[Some("en-US")]);
        let published = project(&value, &PublishCultures::parse("da-DK"));
        assert_eq!(published.layout.get(&EditorAlias::BlockList), Some(&[][..]));
        assert!(published.content.is_empty());
    }

    #[test]
    fn test_dangling_settings_key_dropped() {
        let mut value = BlockValue::new();
        let key = add_block(&mut value, &EditorAlias::BlockList, &[None]);
        let settings_key = value.layout.get(&EditorAlias::BlockList).unwrap()[0].settings_key.unwrap();
        value.settings.delete(settings_key);

        let published = project(&value, &PublishCultures::invariant());
        let item = &published.layout.get(&EditorAlias::BlockList).unwrap()[0];
        assert_eq!(item.content_key, key);
        assert!(item.settings_key.is_none());
    }

    #[test]
    fn test_nested_grid_items_follow_parent() {
        let mut value = BlockValue::new();
        let parent = BlockKey::new_v4();
        let child = BlockKey::new_v4();
        let type_key = ContentTypeKey::new_v4();
        value.content.insert(BlockItemData::new(parent, type_key, "row")).unwrap();
        value.content.insert(BlockItemData::new(child, type_key, "cell")).unwrap();
        value.layout.append(
            &EditorAlias::BlockGrid,
            LayoutItem::grid(parent, None, 12, 1).with_area(Uuid::new_v4(), vec![LayoutItem::grid(child, None, 6, 1)]),
        );
        value.expose.add(ExposeEntry::new(parent, Some("en-US"), None));
        value.expose.add(ExposeEntry::new(child, Some("en-US"), None));
        value.expose.add(ExposeEntry::new(child, Some("da-DK"), None));

        let en = project(&value, &PublishCultures::parse("en-US"));
        assert!(en.layout.references_content(child));

        // Child exposed in da-DK, but its parent is not
        let da = project(&value, &PublishCultures::parse("da-DK"));
        assert!(!da.layout.references_content(child));
        assert!(da.content.is_empty());
        assert!(da.expose.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mut value = BlockValue::new();
        add_block(&mut value, &EditorAlias::BlockList, &[Some("en-US"), Some("da-DK")]);
        add_block(&mut value, &EditorAlias::RichText, &[Some("da-DK")]);
        add_block(&mut value, &EditorAlias::BlockList, &[None]);

        for list in ["en-US", "da-DK", "*", "en-US,da-DK", ""] {
            let cultures = PublishCultures::parse(list);
            let once = project(&value, &cultures);
            assert_eq!(project(&once, &cultures), once, "cultures {:?}", list);
        }
    }
}
