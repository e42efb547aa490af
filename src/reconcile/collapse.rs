//! Folding per-culture (or per-segment) values into invariant ones
//!
//! Runs when an element type (or one of its properties) stops varying on
//! an axis. For each record one code survives; its values become the
//! invariant values, every other code's values on that axis are dropped.
//!
//! Survivor precedence:
//! 1. the explicit preferred value (the default culture), if present
//! 2. the earliest exposed code of the owning block, then the earliest
//!    code the record holds values for
//! 3. the lexicographically smallest code

use std::collections::HashMap;

use crate::model::{BlockItemData, BlockKey, ContentTypeKey, ScopedValue, StoreKind, VariationAxis};
use crate::variation::VariationMetadata;

use super::report::ReconcileWarning;

/// Picks the code whose values survive a collapse.
///
/// `candidates` are the codes that actually hold values. Returns `None`
/// only when there are no candidates.
pub fn choose_survivor<'c>(
    candidates: &'c [String],
    preferred: Option<&str>,
    exposure_order: &[String],
) -> Option<&'c str> {
    if let Some(preferred) = preferred {
        if let Some(found) = candidates.iter().find(|c| c.as_str() == preferred) {
            return Some(found.as_str());
        }
    }

    for exposed in exposure_order {
        if let Some(found) = candidates.iter().find(|c| *c == exposed) {
            return Some(found.as_str());
        }
    }

    candidates.iter().min().map(String::as_str)
}

fn property_varies(
    metadata: &dyn VariationMetadata,
    type_key: ContentTypeKey,
    alias: &str,
    axis: VariationAxis,
) -> bool {
    match axis {
        VariationAxis::Culture => metadata.property_varies_by_culture(type_key, alias),
        VariationAxis::Segment => metadata.property_varies_by_segment(type_key, alias),
    }
}

/// Collapses one record on `axis`.
///
/// Returns a warning when values were moved, `None` when the record had
/// nothing to collapse.
pub(crate) fn collapse_record(
    record: &mut BlockItemData,
    store: StoreKind,
    axis: VariationAxis,
    metadata: &dyn VariationMetadata,
    preferred: Option<&str>,
    exposure_order: &[String],
) -> Option<ReconcileWarning> {
    let type_key = record.content_type_key;
    let stale = |v: &ScopedValue| {
        v.axis(axis).is_some() && !property_varies(metadata, type_key, &v.property_alias, axis)
    };

    let mut candidates: Vec<String> = Vec::new();
    for value in record.values.iter().filter(|v| stale(*v)) {
        if let Some(code) = value.axis(axis) {
            if !candidates.iter().any(|c| c == code) {
                candidates.push(code.to_string());
            }
        }
    }
    // Exposure order first, then the order values were added to the record
    let mut order = exposure_order.to_vec();
    for code in record.axis_values(axis) {
        if !order.contains(&code) {
            order.push(code);
        }
    }
    let survivor = choose_survivor(&candidates, preferred, &order)?.to_string();

    let mut kept = Vec::with_capacity(record.values.len());
    let mut promoted = Vec::new();
    for value in record.values.drain(..) {
        if !stale(&value) {
            kept.push(value);
        } else if value.axis(axis) == Some(survivor.as_str()) {
            let variant = value.variant().with(axis, None);
            promoted.push(ScopedValue::new(value.property_alias, &variant, value.value));
        }
    }

    // The survivor replaces an existing value at the collapsed coordinate
    for value in promoted {
        kept.retain(|k: &ScopedValue| {
            !(k.property_alias == value.property_alias
                && k.culture == value.culture
                && k.segment == value.segment)
        });
        kept.push(value);
    }
    record.values = kept;

    let discarded = candidates.into_iter().filter(|c| *c != survivor).collect();
    Some(ReconcileWarning::ValuesCollapsed {
        store,
        key: record.key,
        axis,
        survivor,
        discarded,
    })
}

/// Settings key -> owning content key, from layout items.
pub(crate) fn settings_owners(value: &crate::model::BlockValue) -> HashMap<BlockKey, BlockKey> {
    let mut owners = HashMap::new();
    value.layout.walk(&mut |_, item| {
        if let Some(settings_key) = item.settings_key {
            owners.entry(settings_key).or_insert(item.content_key);
        }
    });
    owners
}
