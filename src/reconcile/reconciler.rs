//! Reconciler
//!
//! Keeps layout, record stores and exposure consistent when:
//! - a block is inserted or exposed while editing a (culture, segment)
//! - a block is removed from one variation context
//! - the owning property or element types change how they vary
//!
//! Every operation stages its changes on a copy, validates the copy, and
//! replaces the caller's value only on success.

use crate::integrity::BlockValueValidator;
use crate::layout::{collect_orphans, Batch, CommitReport};
use crate::model::{
    BlockError, BlockItemData, BlockKey, BlockResult, BlockValue, EditorAlias, ExposeEntry, LayoutItem,
    ReferenceOrigin, StoreKind, VariationAxis, Variant,
};
use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope};
use crate::variation::{PropertyVariation, VariationConfig, VariationMetadata};

use super::collapse::{collapse_record, settings_owners};
use super::report::{ReconcileReport, ReconcileWarning};

const AXES: [VariationAxis; 2] = [VariationAxis::Culture, VariationAxis::Segment];

/// A block about to be inserted: its layout item and records.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub item: LayoutItem,
    pub content: BlockItemData,
    pub settings: Option<BlockItemData>,
}

impl NewBlock {
    pub fn new(item: LayoutItem, content: BlockItemData) -> Self {
        Self {
            item,
            content,
            settings: None,
        }
    }

    pub fn with_settings(mut self, settings: BlockItemData) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// Reconciler for one block-valued property.
pub struct Reconciler<'a> {
    metadata: &'a dyn VariationMetadata,
    owner: PropertyVariation,
    config: &'a VariationConfig,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> Reconciler<'a> {
    pub fn new(metadata: &'a dyn VariationMetadata, owner: PropertyVariation, config: &'a VariationConfig) -> Self {
        Self {
            metadata,
            owner,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn owner(&self) -> PropertyVariation {
        self.owner
    }

    pub fn validator(&self) -> BlockValueValidator<'a> {
        BlockValueValidator::new(self.metadata, self.owner)
    }

    // ========================================================================
    // Block insertion / removal
    // ========================================================================

    /// Inserts a block while editing `context`.
    pub fn insert_block(
        &self,
        value: &mut BlockValue,
        editor: &EditorAlias,
        block: NewBlock,
        context: &Variant,
    ) -> BlockResult<ReconcileReport> {
        self.insert_block_with(value, editor, block, context, &[])
    }

    /// Inserts a block exposed for `context` and for every culture in
    /// `extra_cultures` (cultures the block already carries values for).
    ///
    /// Extra cultures are ignored when the owner does not vary by culture.
    pub fn insert_block_with(
        &self,
        value: &mut BlockValue,
        editor: &EditorAlias,
        block: NewBlock,
        context: &Variant,
        extra_cultures: &[&str],
    ) -> BlockResult<ReconcileReport> {
        let NewBlock {
            mut item,
            content,
            settings,
        } = block;

        if item.content_key != content.key {
            return Err(BlockError::KeyMismatch {
                expected: item.content_key,
                actual: content.key,
            });
        }
        if let Some(settings) = &settings {
            match item.settings_key {
                Some(expected) if expected != settings.key => {
                    return Err(BlockError::KeyMismatch {
                        expected,
                        actual: settings.key,
                    })
                }
                Some(_) => {}
                None => item.settings_key = Some(settings.key),
            }
        }

        let rows = self.exposure_rows(context, extra_cultures, &content)?;
        let key = content.key;
        let before = value.expose.clone();

        let mut batch = Batch::new();
        batch.insert_record(StoreKind::Content, content);
        if let Some(settings) = settings {
            batch.insert_record(StoreKind::Settings, settings);
        }
        batch.append(editor.clone(), item);
        for row in &rows {
            batch.expose(ExposeEntry::at(key, row));
        }

        let commit = self.commit(batch, value)?;
        if let Some(metrics) = self.metrics {
            metrics.increment_blocks_inserted();
        }

        let key_field = key.to_string();
        let rows_field = rows.len().to_string();
        log_event(
            Event::BlockInserted,
            &[
                ("editor", editor.as_str()),
                ("exposure", rows_field.as_str()),
                ("key", key_field.as_str()),
            ],
        );

        let mut report = ReconcileReport::default().with_exposure_diff(&before, &value.expose);
        report.extend_orphans(commit.collected);
        Ok(report)
    }

    /// Exposes an already placed block in `context`.
    ///
    /// Adding a row that already exists is a no-op.
    pub fn expose_block(&self, value: &mut BlockValue, key: BlockKey, context: &Variant) -> BlockResult<ReconcileReport> {
        let row = self.owner.exposure_variant(context)?;
        self.check_configured(&row)?;
        if !value.layout.references_content(key) {
            return Err(BlockError::DanglingReference {
                key,
                origin: ReferenceOrigin::Expose,
            });
        }

        let before = value.expose.clone();
        let mut batch = Batch::new();
        batch.expose(ExposeEntry::at(key, &row));
        let commit = self.commit(batch, value)?;

        let mut report = ReconcileReport::default().with_exposure_diff(&before, &value.expose);
        report.extend_orphans(commit.collected);
        Ok(report)
    }

    /// Removes a block from the variation context `context`.
    ///
    /// The context's expose row is withdrawn. When it was the block's last
    /// row the layout item goes too, and with it the content and settings
    /// records.
    pub fn remove_block(
        &self,
        value: &mut BlockValue,
        editor: &EditorAlias,
        key: BlockKey,
        context: &Variant,
    ) -> BlockResult<ReconcileReport> {
        let variant = self.owner.exposure_variant(context)?;
        if !value.content.contains(key) {
            return Err(BlockError::DanglingReference {
                key,
                origin: ReferenceOrigin::Store(StoreKind::Content),
            });
        }

        let placed = find_placement(value, editor, key).ok_or(BlockError::DanglingReference {
            key,
            origin: ReferenceOrigin::LayoutContent(editor.to_string()),
        })?;

        let remaining = value.expose.for_key(key).filter(|e| e.variant() != variant).count();
        let before = value.expose.clone();

        let mut batch = Batch::new();
        batch.withdraw(key, variant.clone());
        if remaining == 0 {
            batch.remove_by_content_key(editor.clone(), key);
        }
        let commit = self.commit(batch, value)?;

        let mut report = ReconcileReport::default().with_exposure_diff(&before, &value.expose);
        let key_field = key.to_string();
        let variant_field = variant.to_string();
        if remaining == 0 && !value.content.contains(key) {
            report.removed_blocks.push(key);
            if let Some(metrics) = self.metrics {
                metrics.increment_blocks_removed();
            }
            log_event(
                Event::BlockRemoved,
                &[("editor", editor.as_str()), ("key", key_field.as_str())],
            );
        } else {
            log_event(
                Event::ExposureWithdrawn,
                &[("key", key_field.as_str()), ("variant", variant_field.as_str())],
            );
        }

        // The removed block's own records are expected to go
        let expected = |store: StoreKind, k: BlockKey| match store {
            StoreKind::Content => k == key,
            StoreKind::Settings => Some(k) == placed,
        };
        report.extend_orphans(
            commit
                .collected
                .into_iter()
                .filter(|o| !(remaining == 0 && expected(o.store, o.key)))
                .collect(),
        );
        Ok(report)
    }

    // ========================================================================
    // Variation changes
    // ========================================================================

    /// Brings `value` in line with the owning property now varying as
    /// `after`, and with element types as the metadata now describes them.
    ///
    /// - an axis the owner starts varying on: each null expose row becomes
    ///   one row per configured value
    /// - an axis the owner stops varying on: rows are nulled and merged
    /// - values on an axis their element type no longer varies on are
    ///   collapsed to invariant values (see `choose_survivor`)
    ///
    /// Invariant values are kept as they are when an axis is enabled; reads
    /// fall back to them.
    pub fn reconcile_variation(&self, value: &mut BlockValue, after: PropertyVariation) -> BlockResult<ReconcileReport> {
        let before_field = describe(self.owner);
        let after_field = describe(after);
        let scope = ObservationScope::with_fields(
            "VARIATION_RECONCILE",
            &[("after", after_field.as_str()), ("before", before_field.as_str())],
        );

        match self.stage_variation(value, after) {
            Ok((staged, report)) => {
                *value = staged;
                self.record_variation(&report);
                let added = report.exposure_added.to_string();
                let removed = report.exposure_removed.to_string();
                let warnings = report.warnings.len().to_string();
                scope.complete_with_fields(&[
                    ("exposure_added", added.as_str()),
                    ("exposure_removed", removed.as_str()),
                    ("warnings", warnings.as_str()),
                ]);
                Ok(report)
            }
            Err(err) => {
                scope.fail(&err);
                Err(err)
            }
        }
    }

    fn stage_variation(
        &self,
        current: &BlockValue,
        after: PropertyVariation,
    ) -> BlockResult<(BlockValue, ReconcileReport)> {
        let mut staged = current.clone();
        let mut report = ReconcileReport::default();

        for axis in AXES {
            if after.varies_on(axis) {
                // Null segment rows of a segment-varying owner are default-segment rows
                if axis == VariationAxis::Segment && self.owner.varies_on(axis) {
                    continue;
                }
                let values = self.config.values(axis);
                let has_null_rows = staged.expose.iter().any(|e| e.axis(axis).is_none());
                if axis == VariationAxis::Culture
                    && values.is_empty()
                    && (has_null_rows || !self.owner.varies_on(axis))
                {
                    return Err(BlockError::VariationMismatch {
                        axis,
                        value: "null".into(),
                        reason: format!("owning property varies by {} but no {} is configured", axis, axis),
                    });
                }
                staged.expose.expand_axis(axis, values);
            } else {
                staged.expose.collapse_axis(axis);
            }
        }

        // Exposure order is taken from the value as it was before this run
        let owners = settings_owners(current);
        for axis in AXES {
            let preferred = self.config.preferred(axis);
            for store in [StoreKind::Content, StoreKind::Settings] {
                let mut warnings = Vec::new();
                staged.store_mut(store).for_each_mut(|record| {
                    let exposed_key = match store {
                        StoreKind::Content => Some(record.key),
                        StoreKind::Settings => owners.get(&record.key).copied(),
                    };
                    let order = exposed_key
                        .map(|k| current.expose.axis_values_for(k, axis))
                        .unwrap_or_default();
                    if let Some(warning) = collapse_record(record, store, axis, self.metadata, preferred, &order) {
                        warnings.push(warning);
                    }
                });
                report.warnings.extend(warnings);
            }
        }

        let orphans = collect_orphans(&mut staged);
        report.extend_orphans(orphans);

        BlockValueValidator::new(self.metadata, after).validate(&staged)?;
        let report = report.with_exposure_diff(&current.expose, &staged.expose);
        Ok((staged, report))
    }

    fn record_variation(&self, report: &ReconcileReport) {
        if report.exposure_added > 0 {
            let rows = report.exposure_added.to_string();
            log_event(Event::ExposureExpanded, &[("rows", rows.as_str())]);
        }
        if report.exposure_removed > 0 {
            let rows = report.exposure_removed.to_string();
            log_event(Event::ExposureCollapsed, &[("rows", rows.as_str())]);
        }

        let mut collapsed = 0u64;
        for warning in &report.warnings {
            match warning {
                ReconcileWarning::ValuesCollapsed {
                    store,
                    key,
                    axis,
                    survivor,
                    discarded,
                } => {
                    collapsed += 1;
                    let store = store.to_string();
                    let key = key.to_string();
                    let discarded = discarded.join(",");
                    log_event(
                        Event::ValuesCollapsed,
                        &[
                            ("axis", axis.as_str()),
                            ("discarded", discarded.as_str()),
                            ("key", key.as_str()),
                            ("store", store.as_str()),
                            ("survivor", survivor.as_str()),
                        ],
                    );
                }
                ReconcileWarning::OrphanRecord(orphan) => {
                    let store = orphan.store.to_string();
                    let key = orphan.key.to_string();
                    log_event(
                        Event::OrphanCollected,
                        &[("key", key.as_str()), ("store", store.as_str())],
                    );
                }
            }
        }

        if let Some(metrics) = self.metrics {
            metrics.add_exposure_rows_expanded(report.exposure_added as u64);
            metrics.add_exposure_rows_collapsed(report.exposure_removed as u64);
            metrics.add_records_collapsed(collapsed);
            metrics.add_orphans_collected(report.orphans().count() as u64);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Expose coordinates for an insertion in `context`, base row first.
    ///
    /// Cultures are the editing culture plus `extra_cultures`. Segments are
    /// the editing segment plus every segment `content` holds values for,
    /// null (the default segment) included.
    fn exposure_rows(
        &self,
        context: &Variant,
        extra_cultures: &[&str],
        content: &BlockItemData,
    ) -> BlockResult<Vec<Variant>> {
        let base = self.owner.exposure_variant(context)?;
        self.check_configured(&base)?;

        let mut cultures = vec![base.culture.clone()];
        if self.owner.varies_by_culture {
            for culture in extra_cultures {
                let culture = Some(culture.to_string());
                if !cultures.contains(&culture) {
                    cultures.push(culture);
                }
            }
        }

        let mut segments = vec![base.segment.clone()];
        if self.owner.varies_by_segment {
            for scoped in &content.values {
                if !segments.contains(&scoped.segment) {
                    segments.push(scoped.segment.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(cultures.len() * segments.len());
        for culture in &cultures {
            for segment in &segments {
                let row = Variant::new(culture.as_deref(), segment.as_deref());
                self.check_configured(&row)?;
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Non-null coordinates must be configured on the content item.
    fn check_configured(&self, variant: &Variant) -> BlockResult<()> {
        for axis in AXES {
            if let Some(code) = variant.get(axis) {
                if !self.config.values(axis).iter().any(|c| c == code) {
                    return Err(BlockError::VariationMismatch {
                        axis,
                        value: code.to_string(),
                        reason: format!("{} is not configured on the content item", axis),
                    });
                }
            }
        }
        Ok(())
    }

    fn commit(&self, batch: Batch, value: &mut BlockValue) -> BlockResult<CommitReport> {
        let result = batch.commit_validated(value, &self.validator());
        if let Some(metrics) = self.metrics {
            match &result {
                Ok(commit) => {
                    metrics.increment_batches_committed();
                    metrics.add_orphans_collected(commit.collected.len() as u64);
                }
                Err(_) => metrics.increment_batches_rejected(),
            }
        }
        result
    }
}

/// Settings key of the item placing `key` under `editor`, if placed there.
///
/// Outer `None`: not placed under `editor`. Inner `None`: placed without settings.
fn find_placement(value: &BlockValue, editor: &EditorAlias, key: BlockKey) -> Option<Option<BlockKey>> {
    let items = value.layout.get(editor)?;
    let mut found = None;
    for item in items {
        item.walk(&mut |node| {
            if found.is_none() && node.content_key == key {
                found = Some(node.settings_key);
            }
        });
    }
    found
}

fn describe(variation: PropertyVariation) -> String {
    match (variation.varies_by_culture, variation.varies_by_segment) {
        (false, false) => "invariant".to_string(),
        (true, false) => "culture".to_string(),
        (false, true) => "segment".to_string(),
        (true, true) => "culture+segment".to_string(),
    }
}
