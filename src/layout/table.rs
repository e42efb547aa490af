//! Layout Table operations
//!
//! These only reshape the layout. Whether the result still resolves against
//! the record stores is decided when the enclosing batch commits.

use crate::model::{BlockError, BlockKey, BlockResult, EditorAlias, Layout, LayoutItem};

impl Layout {
    /// Appends an item at the end of the editor's list.
    pub fn append(&mut self, editor: &EditorAlias, item: LayoutItem) {
        self.list_mut(editor).push(item);
    }

    /// Removes every item under `editor` whose content key is `key`,
    /// nested grid items included. A removed grid item takes its nested
    /// items with it. Returns how many matching items were removed.
    pub fn remove_by_content_key(&mut self, editor: &EditorAlias, key: BlockKey) -> usize {
        match self.get_mut(editor) {
            Some(items) => remove_from(items, key),
            None => 0,
        }
    }

    /// Removes `key` under every editor alias.
    pub fn remove_everywhere(&mut self, key: BlockKey) -> usize {
        self.iter_mut().map(|(_, items)| remove_from(items, key)).sum()
    }

    /// Reorders the editor's top-level list.
    ///
    /// `ordered` must name every top-level content key exactly once.
    pub fn reorder(&mut self, editor: &EditorAlias, ordered: &[BlockKey]) -> BlockResult<()> {
        let items = self
            .get_mut(editor)
            .ok_or_else(|| BlockError::UnknownEditor(editor.to_string()))?;

        if ordered.len() != items.len() {
            return Err(BlockError::ReorderMismatch {
                editor: editor.to_string(),
                reason: format!("{} keys given for {} items", ordered.len(), items.len()),
            });
        }

        // Resolve every position before touching the list
        let mut taken = vec![false; items.len()];
        let mut positions = Vec::with_capacity(ordered.len());
        for key in ordered {
            let pos = items
                .iter()
                .enumerate()
                .position(|(idx, item)| !taken[idx] && item.content_key == *key)
                .ok_or_else(|| BlockError::ReorderMismatch {
                    editor: editor.to_string(),
                    reason: format!("block {} is not in this layout (or listed twice)", key),
                })?;
            taken[pos] = true;
            positions.push(pos);
        }

        let mut slots: Vec<Option<LayoutItem>> = items.drain(..).map(Some).collect();
        for pos in positions {
            if let Some(item) = slots[pos].take() {
                items.push(item);
            }
        }
        Ok(())
    }
}

fn remove_from(items: &mut Vec<LayoutItem>, key: BlockKey) -> usize {
    let before = items.len();
    items.retain(|item| item.content_key != key);
    let mut removed = before - items.len();

    for item in items.iter_mut() {
        if let Some(areas) = item.areas_mut() {
            for area in areas.iter_mut() {
                removed += remove_from(&mut area.items, key);
            }
        }
    }
    removed
}
