//! Block value data model
//!
//! A block value stores one or more block instances inside a single
//! content property:
//!
//! - `contentData` / `settingsData`: records addressed by key
//! - `layout`: ordered placements per editor alias
//! - `expose`: (content key, culture, segment) rows saying where a block is active
//!
//! Model types are plain data plus local checks (unique scopes, wire
//! decoding). Cross-collection rules live in `integrity`, `layout` and
//! `reconcile`.

mod errors;
mod expose;
mod keys;
mod layout;
mod record;
mod value;
mod variant;

pub use errors::{BlockError, BlockErrorCode, BlockResult, ReferenceOrigin, Severity};
pub use expose::ExposeEntry;
pub use keys::{BlockKey, ContentTypeKey};
pub use layout::{
    EditorAlias, GridArea, Layout, LayoutItem, LayoutPayload, BLOCK_GRID_ALIAS, BLOCK_LIST_ALIAS,
    RICH_TEXT_ALIAS,
};
pub use record::{BlockItemData, ScopedValue, StoreKind};
pub use value::{BlockValue, BlockValueWire};
pub use variant::{VariationAxis, Variant};
