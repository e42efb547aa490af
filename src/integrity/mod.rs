//! Referential integrity and variation legality of whole block values

mod validator;

pub use validator::{find_orphans, validate_references, BlockValueValidator};
