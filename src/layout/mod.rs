//! Layout Table and atomic batches
//!
//! Layout operations (`append`, `remove_by_content_key`, `reorder`) reshape
//! the per-editor lists. Referential checks are deferred to batch commit so
//! several edits can pass through intermediate states that would not
//! resolve on their own.

mod batch;
mod table;

pub use batch::{Batch, BatchOp, CommitReport, OrphanRecord};

pub(crate) use batch::collect_orphans;
