//! All-or-nothing batches over a block value
//!
//! A batch is a list of staged operations. Commit applies them to a private
//! copy of the value, checks the copy, garbage-collects records no layout
//! item references any more, and only then replaces the caller's value.
//! On any error the caller's value is exactly what it was before.

use crate::integrity::{find_orphans, validate_references, BlockValueValidator};
use crate::model::{
    BlockItemData, BlockKey, BlockResult, BlockValue, EditorAlias, ExposeEntry, LayoutItem, StoreKind,
    Variant,
};
use crate::observability::{log_event, Event};

/// One staged operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Append { editor: EditorAlias, item: LayoutItem },
    Remove { editor: EditorAlias, content_key: BlockKey },
    Reorder { editor: EditorAlias, keys: Vec<BlockKey> },
    InsertRecord { store: StoreKind, record: BlockItemData },
    Expose(ExposeEntry),
    Withdraw { content_key: BlockKey, variant: Variant },
}

/// A record removed at commit because nothing referenced it.
///
/// Not an error: it is reported so the caller can tell the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanRecord {
    pub store: StoreKind,
    pub key: BlockKey,
    /// Expose rows removed together with a content record.
    pub expose_rows: usize,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub applied: usize,
    pub collected: Vec<OrphanRecord>,
}

/// Staged operations, applied together or not at all.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, editor: EditorAlias, item: LayoutItem) -> &mut Self {
        self.ops.push(BatchOp::Append { editor, item });
        self
    }

    pub fn remove_by_content_key(&mut self, editor: EditorAlias, content_key: BlockKey) -> &mut Self {
        self.ops.push(BatchOp::Remove { editor, content_key });
        self
    }

    pub fn reorder(&mut self, editor: EditorAlias, keys: Vec<BlockKey>) -> &mut Self {
        self.ops.push(BatchOp::Reorder { editor, keys });
        self
    }

    pub fn insert_record(&mut self, store: StoreKind, record: BlockItemData) -> &mut Self {
        self.ops.push(BatchOp::InsertRecord { store, record });
        self
    }

    pub fn expose(&mut self, entry: ExposeEntry) -> &mut Self {
        self.ops.push(BatchOp::Expose(entry));
        self
    }

    pub fn withdraw(&mut self, content_key: BlockKey, variant: Variant) -> &mut Self {
        self.ops.push(BatchOp::Withdraw { content_key, variant });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Commits after checking cross-references only.
    pub fn commit(self, value: &mut BlockValue) -> BlockResult<CommitReport> {
        self.commit_inner(value, None)
    }

    /// Commits after a full validation against element-type and owner
    /// variation.
    pub fn commit_validated(
        self,
        value: &mut BlockValue,
        validator: &BlockValueValidator<'_>,
    ) -> BlockResult<CommitReport> {
        self.commit_inner(value, Some(validator))
    }

    fn commit_inner(
        self,
        value: &mut BlockValue,
        validator: Option<&BlockValueValidator<'_>>,
    ) -> BlockResult<CommitReport> {
        let applied = self.ops.len();
        match stage(self.ops, value, validator) {
            Ok((staged, collected)) => {
                *value = staged;
                for orphan in &collected {
                    let expose_rows = orphan.expose_rows.to_string();
                    let key = orphan.key.to_string();
                    let store = orphan.store.to_string();
                    log_event(
                        Event::OrphanCollected,
                        &[
                            ("expose_rows", expose_rows.as_str()),
                            ("key", key.as_str()),
                            ("store", store.as_str()),
                        ],
                    );
                }
                let collected_count = collected.len().to_string();
                let ops = applied.to_string();
                log_event(
                    Event::BatchCommitted,
                    &[("collected", collected_count.as_str()), ("ops", ops.as_str())],
                );
                Ok(CommitReport { applied, collected })
            }
            Err(err) => {
                let key = err.key().map(|k| k.to_string()).unwrap_or_default();
                let ops = applied.to_string();
                log_event(
                    Event::BatchRejected,
                    &[("code", err.code().code()), ("key", key.as_str()), ("ops", ops.as_str())],
                );
                Err(err)
            }
        }
    }
}

/// Builds the post-commit value without touching `current`.
fn stage(
    ops: Vec<BatchOp>,
    current: &BlockValue,
    validator: Option<&BlockValueValidator<'_>>,
) -> BlockResult<(BlockValue, Vec<OrphanRecord>)> {
    let mut staged = current.clone();

    for op in ops {
        match op {
            BatchOp::Append { editor, item } => staged.layout.append(&editor, item),
            BatchOp::Remove { editor, content_key } => {
                staged.layout.remove_by_content_key(&editor, content_key);
            }
            BatchOp::Reorder { editor, keys } => staged.layout.reorder(&editor, &keys)?,
            BatchOp::InsertRecord { store, record } => staged.store_mut(store).insert(record)?,
            BatchOp::Expose(entry) => {
                staged.expose.add(entry);
            }
            BatchOp::Withdraw { content_key, variant } => {
                staged.expose.remove(content_key, &variant);
            }
        }
    }

    validate_references(&staged)?;
    let collected = collect_orphans(&mut staged);
    if let Some(validator) = validator {
        validator.validate(&staged)?;
    }

    Ok((staged, collected))
}

/// Deletes records no layout item references, with their expose rows.
pub(crate) fn collect_orphans(value: &mut BlockValue) -> Vec<OrphanRecord> {
    find_orphans(value)
        .into_iter()
        .map(|(store, key)| {
            value.store_mut(store).delete(key);
            let expose_rows = match store {
                StoreKind::Content => value.expose.remove_key(key),
                StoreKind::Settings => 0,
            };
            OrphanRecord { store, key, expose_rows }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockError, ContentTypeKey};

    fn record(key: BlockKey) -> BlockItemData {
        BlockItemData::new(key, ContentTypeKey::new_v4(), "headline")
    }

    #[test]
    fn test_insert_block_in_one_batch() {
        let content = BlockKey::new_v4();
        let settings = BlockKey::new_v4();
        let mut value = BlockValue::new();

        let mut batch = Batch::new();
        batch
            .insert_record(StoreKind::Content, record(content))
            .insert_record(StoreKind::Settings, record(settings))
            .append(EditorAlias::BlockList, LayoutItem::list(content, Some(settings)))
            .expose(ExposeEntry::new(content, None, None));

        let report = batch.commit(&mut value).unwrap();
        assert_eq!(report.applied, 4);
        assert!(report.collected.is_empty());
        assert!(value.layout.references_content(content));
        assert!(value.settings.contains(settings));
    }

    #[test]
    fn test_dangling_batch_leaves_value_untouched() {
        let good = BlockKey::new_v4();
        let mut value = BlockValue::new();
        let mut batch = Batch::new();
        batch
            .insert_record(StoreKind::Content, record(good))
            .append(EditorAlias::BlockList, LayoutItem::list(good, None))
            .expose(ExposeEntry::new(good, None, None));
        batch.commit(&mut value).unwrap();
        let before = value.clone();

        let ghost = BlockKey::new_v4();
        let mut batch = Batch::new();
        batch
            .remove_by_content_key(EditorAlias::BlockList, good)
            .append(EditorAlias::BlockList, LayoutItem::list(ghost, None));

        let err = batch.commit(&mut value).unwrap_err();
        assert_eq!(err.code(), crate::model::BlockErrorCode::DanglingReference);
        assert_eq!(err.key(), Some(ghost));
        assert_eq!(value, before);
    }

    #[test]
    fn test_removed_layout_item_collects_records_and_exposure() {
        let content = BlockKey::new_v4();
        let settings = BlockKey::new_v4();
        let mut value = BlockValue::new();
        let mut batch = Batch::new();
        batch
            .insert_record(StoreKind::Content, record(content))
            .insert_record(StoreKind::Settings, record(settings))
            .append(EditorAlias::BlockList, LayoutItem::list(content, Some(settings)))
            .expose(ExposeEntry::new(content, Some("en-US"), None))
            .expose(ExposeEntry::new(content, Some("da-DK"), None));
        batch.commit(&mut value).unwrap();

        let mut batch = Batch::new();
        batch.remove_by_content_key(EditorAlias::BlockList, content);
        let report = batch.commit(&mut value).unwrap();

        assert_eq!(
            report.collected,
            vec![
                OrphanRecord {
                    store: StoreKind::Content,
                    key: content,
                    expose_rows: 2
                },
                OrphanRecord {
                    store: StoreKind::Settings,
                    key: settings,
                    expose_rows: 0
                },
            ]
        );
        assert!(value.is_empty());
    }

    #[test]
    fn test_reorder_error_aborts_whole_batch() {
        let content = BlockKey::new_v4();
        let mut value = BlockValue::new();
        let mut batch = Batch::new();
        batch
            .insert_record(StoreKind::Content, record(content))
            .append(EditorAlias::BlockList, LayoutItem::list(content, None))
            .reorder(EditorAlias::BlockList, vec![BlockKey::new_v4()]);

        assert!(matches!(
            batch.commit(&mut value).unwrap_err(),
            BlockError::ReorderMismatch { .. }
        ));
        assert!(value.is_empty());
    }
}
