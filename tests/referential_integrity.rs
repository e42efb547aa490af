//! Referential Integrity Tests
//!
//! - Every layout key and expose row resolves to a record
//! - A rejected batch leaves the value untouched
//! - Records no layout item references are collected with their expose rows
//! - Decoding rejects duplicate keys and duplicate value scopes

use blockvalue::integrity::{find_orphans, validate_references};
use blockvalue::layout::Batch;
use blockvalue::model::{
    BlockError, BlockErrorCode, BlockItemData, BlockKey, BlockValue, ContentTypeKey, EditorAlias, ExposeEntry,
    LayoutItem, ReferenceOrigin, ScopedValue, StoreKind, Variant,
};
use serde_json::json;
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn record(key: BlockKey) -> BlockItemData {
    BlockItemData::new(key, ContentTypeKey::new_v4(), "headline")
}

/// A list block with settings, exposed invariantly.
fn placed_block(value: &mut BlockValue) -> (BlockKey, BlockKey) {
    let content = BlockKey::new_v4();
    let settings = BlockKey::new_v4();
    value.content.insert(record(content)).unwrap();
    value.settings.insert(record(settings)).unwrap();
    value.layout.append(&EditorAlias::BlockList, LayoutItem::list(content, Some(settings)));
    value.expose.add(ExposeEntry::new(content, None, None));
    (content, settings)
}

fn three_blocks() -> (BlockValue, Vec<BlockKey>) {
    let mut value = BlockValue::new();
    let keys = (0..3).map(|_| placed_block(&mut value).0).collect();
    (value, keys)
}

fn top_level(value: &BlockValue, editor: &EditorAlias) -> Vec<BlockKey> {
    value
        .layout
        .get(editor)
        .map(|items| items.iter().map(|i| i.content_key).collect())
        .unwrap_or_default()
}

// =============================================================================
// Dangling references
// =============================================================================

#[test]
fn test_layout_content_key_must_resolve() {
    let mut value = BlockValue::new();
    let ghost = BlockKey::new_v4();
    value.layout.append(&EditorAlias::BlockList, LayoutItem::list(ghost, None));

    let err = validate_references(&value).unwrap_err();
    assert_eq!(err.code(), BlockErrorCode::DanglingReference);
    assert_eq!(
        err,
        BlockError::DanglingReference {
            key: ghost,
            origin: ReferenceOrigin::LayoutContent(EditorAlias::BlockList.to_string()),
        }
    );
}

#[test]
fn test_layout_settings_key_must_resolve() {
    let mut value = BlockValue::new();
    let content = BlockKey::new_v4();
    let ghost = BlockKey::new_v4();
    value.content.insert(record(content)).unwrap();
    value.layout.append(&EditorAlias::BlockList, LayoutItem::list(content, Some(ghost)));

    let err = validate_references(&value).unwrap_err();
    assert_eq!(err.key(), Some(ghost));
}

#[test]
fn test_nested_grid_key_must_resolve() {
    let mut value = BlockValue::new();
    let parent = BlockKey::new_v4();
    let ghost = BlockKey::new_v4();
    value.content.insert(record(parent)).unwrap();
    value.layout.append(
        &EditorAlias::BlockGrid,
        LayoutItem::grid(parent, None, 12, 1).with_area(Uuid::new_v4(), vec![LayoutItem::grid(ghost, None, 6, 1)]),
    );

    assert_eq!(validate_references(&value).unwrap_err().key(), Some(ghost));
}

#[test]
fn test_expose_row_must_resolve() {
    let (mut value, _) = three_blocks();
    let ghost = BlockKey::new_v4();
    value.expose.add(ExposeEntry::new(ghost, None, None));

    let err = validate_references(&value).unwrap_err();
    assert!(matches!(err, BlockError::DanglingReference { origin: ReferenceOrigin::Expose, .. }));
}

#[test]
fn test_consistent_value_passes() {
    let (value, _) = three_blocks();
    assert!(validate_references(&value).is_ok());
    assert!(find_orphans(&value).is_empty());
}

// =============================================================================
// Batch atomicity
// =============================================================================

#[test]
fn test_rejected_batch_leaves_value_unchanged() {
    let (mut value, keys) = three_blocks();
    let snapshot = value.clone();

    // Valid ops followed by one dangling append
    let fresh = BlockKey::new_v4();
    let mut batch = Batch::new();
    batch
        .insert_record(StoreKind::Content, record(fresh))
        .append(EditorAlias::BlockList, LayoutItem::list(fresh, None))
        .remove_by_content_key(EditorAlias::BlockList, keys[0])
        .append(EditorAlias::BlockList, LayoutItem::list(BlockKey::new_v4(), None));

    assert!(batch.commit(&mut value).is_err());
    assert_eq!(value, snapshot);
}

#[test]
fn test_duplicate_insert_rejects_whole_batch() {
    let (mut value, keys) = three_blocks();
    let snapshot = value.clone();

    let mut batch = Batch::new();
    batch
        .withdraw(keys[1], Variant::invariant())
        .insert_record(StoreKind::Content, record(keys[2]));

    let err = batch.commit(&mut value).unwrap_err();
    assert_eq!(err.code(), BlockErrorCode::DuplicateKey);
    assert_eq!(value, snapshot);
}

#[test]
fn test_expose_before_record_in_same_batch() {
    let mut value = BlockValue::new();
    let key = BlockKey::new_v4();

    // Intermediate states may dangle; only the end state is checked
    let mut batch = Batch::new();
    batch
        .expose(ExposeEntry::new(key, None, None))
        .append(EditorAlias::BlockList, LayoutItem::list(key, None))
        .insert_record(StoreKind::Content, record(key));

    let report = batch.commit(&mut value).unwrap();
    assert_eq!(report.applied, 3);
    assert!(validate_references(&value).is_ok());
}

// =============================================================================
// Reorder
// =============================================================================

#[test]
fn test_reorder_applies_permutation() {
    let (mut value, keys) = three_blocks();
    let order = vec![keys[2], keys[0], keys[1]];

    let mut batch = Batch::new();
    batch.reorder(EditorAlias::BlockList, order.clone());
    batch.commit(&mut value).unwrap();

    assert_eq!(top_level(&value, &EditorAlias::BlockList), order);
}

#[test]
fn test_reorder_with_missing_key_rejected() {
    let (mut value, keys) = three_blocks();
    let snapshot = value.clone();

    let mut batch = Batch::new();
    batch.reorder(EditorAlias::BlockList, vec![keys[2], keys[0]]);
    let err = batch.commit(&mut value).unwrap_err();

    assert_eq!(err.code(), BlockErrorCode::ReorderMismatch);
    assert_eq!(value, snapshot);
}

#[test]
fn test_reorder_with_foreign_or_repeated_key_rejected() {
    let (mut value, keys) = three_blocks();

    let mut foreign = Batch::new();
    foreign.reorder(EditorAlias::BlockList, vec![keys[0], keys[1], BlockKey::new_v4()]);
    assert_eq!(foreign.commit(&mut value).unwrap_err().code(), BlockErrorCode::ReorderMismatch);

    let mut repeated = Batch::new();
    repeated.reorder(EditorAlias::BlockList, vec![keys[0], keys[0], keys[1]]);
    assert_eq!(repeated.commit(&mut value).unwrap_err().code(), BlockErrorCode::ReorderMismatch);
}

#[test]
fn test_reorder_unknown_editor_rejected() {
    let (mut value, keys) = three_blocks();
    let mut batch = Batch::new();
    batch.reorder(EditorAlias::BlockGrid, keys);
    assert_eq!(batch.commit(&mut value).unwrap_err().code(), BlockErrorCode::UnknownEditor);
}

// =============================================================================
// Orphan collection
// =============================================================================

#[test]
fn test_removed_block_takes_records_and_exposure() {
    let (mut value, keys) = three_blocks();
    let settings = value.layout.get(&EditorAlias::BlockList).unwrap()[1].settings_key.unwrap();

    let mut batch = Batch::new();
    batch.remove_by_content_key(EditorAlias::BlockList, keys[1]);
    let report = batch.commit(&mut value).unwrap();

    assert_eq!(report.collected.len(), 2);
    let content = report.collected.iter().find(|o| o.store == StoreKind::Content).unwrap();
    assert_eq!(content.key, keys[1]);
    assert_eq!(content.expose_rows, 1);
    assert!(report.collected.iter().any(|o| o.store == StoreKind::Settings && o.key == settings));

    assert!(!value.content.contains(keys[1]));
    assert!(!value.settings.contains(settings));
    assert!(!value.expose.is_exposed(keys[1]));
    assert_eq!(value.expose.len(), 2);
    assert!(validate_references(&value).is_ok());
}

#[test]
fn test_unplaced_settings_record_collected() {
    let (mut value, _) = three_blocks();
    let stray = BlockKey::new_v4();

    let mut batch = Batch::new();
    batch.insert_record(StoreKind::Settings, record(stray));
    let report = batch.commit(&mut value).unwrap();

    assert_eq!(report.collected.len(), 1);
    assert_eq!(report.collected[0].store, StoreKind::Settings);
    assert_eq!(report.collected[0].key, stray);
    assert_eq!(report.collected[0].expose_rows, 0);
    assert!(!value.settings.contains(stray));
}

#[test]
fn test_removing_grid_parent_collects_nested_children() {
    let mut value = BlockValue::new();
    let parent = BlockKey::new_v4();
    let child = BlockKey::new_v4();
    value.content.insert(record(parent)).unwrap();
    value.content.insert(record(child)).unwrap();
    value.layout.append(
        &EditorAlias::BlockGrid,
        LayoutItem::grid(parent, None, 12, 1).with_area(Uuid::new_v4(), vec![LayoutItem::grid(child, None, 6, 1)]),
    );
    value.expose.add(ExposeEntry::new(parent, None, None));
    value.expose.add(ExposeEntry::new(child, None, None));

    let mut batch = Batch::new();
    batch.remove_by_content_key(EditorAlias::BlockGrid, parent);
    let report = batch.commit(&mut value).unwrap();

    assert_eq!(report.collected.len(), 2);
    assert!(value.content.is_empty());
    assert!(value.expose.is_empty());
    assert_eq!(top_level(&value, &EditorAlias::BlockGrid), Vec::<BlockKey>::new());
}

#[test]
fn test_block_placed_under_two_editors_survives_one_removal() {
    let (mut value, keys) = three_blocks();
    value.layout.append(&EditorAlias::RichText, LayoutItem::rich_text(keys[0], None, true));

    let mut batch = Batch::new();
    batch.remove_by_content_key(EditorAlias::BlockList, keys[0]);
    let report = batch.commit(&mut value).unwrap();

    // Only the settings record went with the list item
    assert_eq!(report.collected.len(), 1);
    assert_eq!(report.collected[0].store, StoreKind::Settings);
    assert!(value.content.contains(keys[0]));
    assert!(value.expose.is_exposed(keys[0]));
}

// =============================================================================
// Wire decoding
// =============================================================================

fn wire(content: serde_json::Value) -> serde_json::Value {
    json!({
        "layout": {},
        "contentData": content,
        "settingsData": [],
        "expose": []
    })
}

#[test]
fn test_decode_rejects_duplicate_keys() {
    let key = BlockKey::new_v4();
    let type_key = ContentTypeKey::new_v4();
    let item = json!({ "key": key, "contentTypeKey": type_key, "values": [] });

    let err = BlockValue::from_json_value(wire(json!([item.clone(), item]))).unwrap_err();
    assert_eq!(err.code(), BlockErrorCode::DuplicateKey);
    assert_eq!(err.key(), Some(key));
}

#[test]
fn test_decode_rejects_duplicate_scopes() {
    let key = BlockKey::new_v4();
    let item = json!({
        "key": key,
        "contentTypeKey": ContentTypeKey::new_v4(),
        "values": [
            { "propertyAlias": "title", "culture": "en-US", "segment": null, "value": "a" },
            { "propertyAlias": "title", "culture": "en-US", "value": "b" }
        ]
    });

    let err = BlockValue::from_json_value(wire(json!([item]))).unwrap_err();
    assert_eq!(err.code(), BlockErrorCode::DuplicateScope);
}

#[test]
fn test_decode_accepts_same_alias_in_distinct_scopes() {
    let item = json!({
        "key": BlockKey::new_v4(),
        "contentTypeKey": ContentTypeKey::new_v4(),
        "values": [
            { "propertyAlias": "title", "culture": "en-US", "value": "a" },
            { "propertyAlias": "title", "culture": "da-DK", "value": "b" },
            { "propertyAlias": "title", "value": "c" }
        ]
    });
    assert!(BlockValue::from_json_value(wire(json!([item]))).is_ok());
}

#[test]
fn test_decode_rejects_malformed_json() {
    let err = BlockValue::from_json("{\"contentData\": 7}").unwrap_err();
    assert_eq!(err.code(), BlockErrorCode::Malformed);
}

#[test]
fn test_decoded_value_reencodes_equal() {
    let (mut value, keys) = three_blocks();
    let record = value.content.record(keys[0]).unwrap().clone();
    value.content.delete(keys[0]);
    value
        .content
        .insert(record.with_value(ScopedValue::new("title", &Variant::culture("en-US"), json!("Hi"))))
        .unwrap();

    let decoded = BlockValue::from_json(&value.to_json().unwrap()).unwrap();
    assert_eq!(decoded, value);
}
