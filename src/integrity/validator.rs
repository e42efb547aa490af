//! Whole-value validator
//!
//! Checks, in this order:
//! - every layout `contentKey` resolves in the content store
//! - every layout `settingsKey` resolves in the settings store
//! - every expose row resolves in the content store
//! - expose rows follow the owning property's variation, no duplicates
//! - every record has unique scopes
//! - every scoped value is legal for its element type
//!
//! The first violation is returned. Validation never mutates the value and
//! gives the same answer for the same input.

use crate::model::{BlockError, BlockKey, BlockResult, BlockValue, ReferenceOrigin, StoreKind};
use crate::variation::{check_value_scope, PropertyVariation, VariationMetadata};

/// Validator for block values against element-type and owner variation.
pub struct BlockValueValidator<'a> {
    metadata: &'a dyn VariationMetadata,
    owner: PropertyVariation,
}

impl<'a> BlockValueValidator<'a> {
    pub fn new(metadata: &'a dyn VariationMetadata, owner: PropertyVariation) -> Self {
        Self { metadata, owner }
    }

    pub fn owner(&self) -> PropertyVariation {
        self.owner
    }

    /// Runs every check.
    pub fn validate(&self, value: &BlockValue) -> BlockResult<()> {
        validate_references(value)?;
        self.validate_exposure(value)?;
        self.validate_records(value)?;
        Ok(())
    }

    /// Expose rows: shaped like the owner, unique.
    pub fn validate_exposure(&self, value: &BlockValue) -> BlockResult<()> {
        for entry in value.expose.iter() {
            self.owner.check_exposure(entry)?;
        }

        if let Some(dup) = value.expose.first_duplicate() {
            return Err(BlockError::DuplicateExposure {
                key: dup.content_key,
                culture: dup.culture.clone(),
                segment: dup.segment.clone(),
            });
        }
        Ok(())
    }

    /// Records: unique scopes and legal coordinates.
    pub fn validate_records(&self, value: &BlockValue) -> BlockResult<()> {
        for store in [&value.content, &value.settings] {
            for record in store.records() {
                record.check_unique_scopes()?;
                for scoped in &record.values {
                    check_value_scope(
                        self.metadata,
                        record.content_type_key,
                        &scoped.property_alias,
                        &scoped.variant(),
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Cross-references only: layout keys and expose rows must resolve.
///
/// This is the check every batch must pass before it is accepted.
pub fn validate_references(value: &BlockValue) -> BlockResult<()> {
    let mut failure: Option<BlockError> = None;
    value.layout.walk(&mut |editor, item| {
        if failure.is_some() {
            return;
        }
        if !value.content.contains(item.content_key) {
            failure = Some(BlockError::DanglingReference {
                key: item.content_key,
                origin: ReferenceOrigin::LayoutContent(editor.to_string()),
            });
        } else if let Some(settings_key) = item.settings_key {
            if !value.settings.contains(settings_key) {
                failure = Some(BlockError::DanglingReference {
                    key: settings_key,
                    origin: ReferenceOrigin::LayoutSettings(editor.to_string()),
                });
            }
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }

    for entry in value.expose.iter() {
        if !value.content.contains(entry.content_key) {
            return Err(BlockError::DanglingReference {
                key: entry.content_key,
                origin: ReferenceOrigin::Expose,
            });
        }
    }
    Ok(())
}

/// Records no layout item references, content first, in store order.
pub fn find_orphans(value: &BlockValue) -> Vec<(StoreKind, BlockKey)> {
    let mut orphans = Vec::new();
    for key in value.content.keys() {
        if !value.layout.references_content(key) {
            orphans.push((StoreKind::Content, key));
        }
    }
    for key in value.settings.keys() {
        if !value.layout.references_settings(key) {
            orphans.push((StoreKind::Settings, key));
        }
    }
    orphans
}
