//! Block value error types
//!
//! Error codes:
//! - BLOCK_DANGLING_REFERENCE (REJECT)
//! - BLOCK_VARIATION_MISMATCH (REJECT)
//! - BLOCK_DUPLICATE_SCOPE (REJECT)
//! - BLOCK_DUPLICATE_KEY (REJECT)
//! - BLOCK_DUPLICATE_EXPOSURE (REJECT)
//! - BLOCK_KEY_MISMATCH (REJECT)
//! - BLOCK_REORDER_MISMATCH (REJECT)
//! - BLOCK_UNKNOWN_EDITOR (REJECT)
//! - BLOCK_MALFORMED_VALUE (REJECT)
//!
//! Every error rejects the whole operation. Nothing is partially applied.

use std::fmt;

use thiserror::Error;

use super::keys::BlockKey;
use super::record::StoreKind;
use super::variant::VariationAxis;

/// Severity levels for block errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation rejected, aggregate untouched
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Stable error codes for block value operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockErrorCode {
    DanglingReference,
    VariationMismatch,
    DuplicateScope,
    DuplicateKey,
    DuplicateExposure,
    KeyMismatch,
    ReorderMismatch,
    UnknownEditor,
    Malformed,
}

impl BlockErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            BlockErrorCode::DanglingReference => "BLOCK_DANGLING_REFERENCE",
            BlockErrorCode::VariationMismatch => "BLOCK_VARIATION_MISMATCH",
            BlockErrorCode::DuplicateScope => "BLOCK_DUPLICATE_SCOPE",
            BlockErrorCode::DuplicateKey => "BLOCK_DUPLICATE_KEY",
            BlockErrorCode::DuplicateExposure => "BLOCK_DUPLICATE_EXPOSURE",
            BlockErrorCode::KeyMismatch => "BLOCK_KEY_MISMATCH",
            BlockErrorCode::ReorderMismatch => "BLOCK_REORDER_MISMATCH",
            BlockErrorCode::UnknownEditor => "BLOCK_UNKNOWN_EDITOR",
            BlockErrorCode::Malformed => "BLOCK_MALFORMED_VALUE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for BlockErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a dangling reference was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOrigin {
    /// `contentKey` of a layout item under the given editor alias
    LayoutContent(String),
    /// `settingsKey` of a layout item under the given editor alias
    LayoutSettings(String),
    /// An expose row
    Expose,
    /// A direct record store access
    Store(StoreKind),
}

impl fmt::Display for ReferenceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceOrigin::LayoutContent(editor) => write!(f, "layout '{}' contentKey", editor),
            ReferenceOrigin::LayoutSettings(editor) => write!(f, "layout '{}' settingsKey", editor),
            ReferenceOrigin::Expose => write!(f, "expose"),
            ReferenceOrigin::Store(kind) => write!(f, "{} store", kind),
        }
    }
}

/// Block value error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
    #[error("{origin} references unknown block {key}")]
    DanglingReference { key: BlockKey, origin: ReferenceOrigin },

    #[error("{axis} '{value}' is not allowed here: {reason}")]
    VariationMismatch {
        axis: VariationAxis,
        value: String,
        reason: String,
    },

    #[error("block {key} has more than one value for '{property_alias}' (culture {culture:?}, segment {segment:?})")]
    DuplicateScope {
        key: BlockKey,
        property_alias: String,
        culture: Option<String>,
        segment: Option<String>,
    },

    #[error("{store} store already holds block {key}")]
    DuplicateKey { key: BlockKey, store: StoreKind },

    #[error("block {key} is exposed twice for culture {culture:?}, segment {segment:?}")]
    DuplicateExposure {
        key: BlockKey,
        culture: Option<String>,
        segment: Option<String>,
    },

    #[error("expected block {expected}, got {actual}")]
    KeyMismatch { expected: BlockKey, actual: BlockKey },

    #[error("reorder of '{editor}' rejected: {reason}")]
    ReorderMismatch { editor: String, reason: String },

    #[error("no layout for editor '{0}'")]
    UnknownEditor(String),

    #[error("malformed block value: {0}")]
    Malformed(String),
}

impl BlockError {
    /// Variation mismatch on the culture axis
    pub fn culture_mismatch(value: impl Into<String>, reason: impl Into<String>) -> Self {
        BlockError::VariationMismatch {
            axis: VariationAxis::Culture,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Variation mismatch on the segment axis
    pub fn segment_mismatch(value: impl Into<String>, reason: impl Into<String>) -> Self {
        BlockError::VariationMismatch {
            axis: VariationAxis::Segment,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> BlockErrorCode {
        match self {
            BlockError::DanglingReference { .. } => BlockErrorCode::DanglingReference,
            BlockError::VariationMismatch { .. } => BlockErrorCode::VariationMismatch,
            BlockError::DuplicateScope { .. } => BlockErrorCode::DuplicateScope,
            BlockError::DuplicateKey { .. } => BlockErrorCode::DuplicateKey,
            BlockError::DuplicateExposure { .. } => BlockErrorCode::DuplicateExposure,
            BlockError::KeyMismatch { .. } => BlockErrorCode::KeyMismatch,
            BlockError::ReorderMismatch { .. } => BlockErrorCode::ReorderMismatch,
            BlockError::UnknownEditor(_) => BlockErrorCode::UnknownEditor,
            BlockError::Malformed(_) => BlockErrorCode::Malformed,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Returns the block key the error is about, if any
    pub fn key(&self) -> Option<BlockKey> {
        match self {
            BlockError::DanglingReference { key, .. }
            | BlockError::DuplicateScope { key, .. }
            | BlockError::DuplicateKey { key, .. }
            | BlockError::DuplicateExposure { key, .. } => Some(*key),
            BlockError::KeyMismatch { actual, .. } => Some(*actual),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BlockError {
    fn from(e: serde_json::Error) -> Self {
        BlockError::Malformed(e.to_string())
    }
}

/// Result type for block value operations
pub type BlockResult<T> = Result<T, BlockError>;
