//! Block Record Store
//!
//! Content and settings records are two instances of the same store.
//! Reads fall back across variation coordinates; writes are exact and
//! checked against the element type's variation.

mod record_store;

pub use record_store::RecordStore;
