//! blockvalue - block-structured property values
//!
//! A block value stores many block instances inside one content property:
//! layout per editor, content and settings records, and exposure rows per
//! (culture, segment). This crate keeps those collections consistent while
//! values are edited and re-variated, and projects them for publishing.
//!
//! Subsystems:
//! - `model`: data model, wire format, errors
//! - `store`: record arena with fallback reads
//! - `layout`: layout operations and atomic batches
//! - `variation`: variation metadata, owner variation, exposure set
//! - `integrity`: whole-value validation
//! - `reconcile`: insertion, removal and variation-change reconciliation
//! - `publish`: publish projection
//! - `connector`: deploy artifact conversion
//! - `observability`: structured logging and counters
//! - `cli`: command-line interface

pub mod cli;
pub mod connector;
pub mod integrity;
pub mod layout;
pub mod model;
pub mod observability;
pub mod publish;
pub mod reconcile;
pub mod store;
pub mod variation;
