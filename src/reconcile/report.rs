//! Reconciliation reports
//!
//! Nothing in a report is an error. Warnings describe data the reconciler
//! removed on the caller's behalf so an editor can be told about it.

use std::fmt;

use crate::layout::OrphanRecord;
use crate::model::{BlockKey, StoreKind, VariationAxis};
use crate::variation::ExposureSet;

/// Something the reconciler removed while keeping the value consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// Record left without layout references, deleted with its expose rows.
    OrphanRecord(OrphanRecord),
    /// Per-culture (or per-segment) values folded into invariant values.
    ///
    /// `survivor`'s values became the invariant ones, values for every
    /// code in `discarded` were dropped.
    ValuesCollapsed {
        store: StoreKind,
        key: BlockKey,
        axis: VariationAxis,
        survivor: String,
        discarded: Vec<String>,
    },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::OrphanRecord(orphan) => {
                write!(f, "{} record {} had no layout item and was removed", orphan.store, orphan.key)
            }
            ReconcileWarning::ValuesCollapsed {
                store,
                key,
                axis,
                survivor,
                discarded,
            } => write!(
                f,
                "{} record {} kept {} '{}' values, discarded {}",
                store,
                key,
                axis,
                survivor,
                discarded.join(", ")
            ),
        }
    }
}

/// Outcome of a reconciler operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Expose rows present after the operation but not before.
    pub exposure_added: usize,
    /// Expose rows present before the operation but not after.
    pub exposure_removed: usize,
    /// Blocks whose layout item and records were removed.
    pub removed_blocks: Vec<BlockKey>,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReconcileReport {
    pub(crate) fn with_exposure_diff(mut self, before: &ExposureSet, after: &ExposureSet) -> Self {
        self.exposure_added = after.iter().filter(|e| !before.contains(e)).count();
        self.exposure_removed = before.iter().filter(|e| !after.contains(e)).count();
        self
    }

    pub(crate) fn extend_orphans(&mut self, orphans: Vec<OrphanRecord>) {
        self.warnings
            .extend(orphans.into_iter().map(ReconcileWarning::OrphanRecord));
    }

    /// Cultures (or segments) whose values were discarded for `key`.
    pub fn discarded_for(&self, key: BlockKey) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                ReconcileWarning::ValuesCollapsed {
                    key: k, discarded, ..
                } if *k == key => Some(discarded.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn orphans(&self) -> impl Iterator<Item = &OrphanRecord> {
        self.warnings.iter().filter_map(|w| match w {
            ReconcileWarning::OrphanRecord(orphan) => Some(orphan),
            _ => None,
        })
    }

    /// True when nothing was discarded or garbage-collected.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
