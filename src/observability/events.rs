//! Observable events
//!
//! Events are explicit and typed. Each maps to one stable log event name.

use std::fmt;

/// Observable events of block value handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Decoding / validation
    /// Stored value decoded and validated
    ValueAccepted,
    /// Stored value failed validation
    ValueRejected,

    // Batches
    /// Batch applied atomically
    BatchCommitted,
    /// Batch rejected, nothing written
    BatchRejected,
    /// Record without layout references removed with its expose rows
    OrphanCollected,

    // Block lifecycle
    /// Block inserted with its records and exposure
    BlockInserted,
    /// Exposure for one variation context withdrawn
    ExposureWithdrawn,
    /// Last exposure gone, block removed
    BlockRemoved,

    // Variation changes
    /// Null rows expanded per configured culture or segment
    ExposureExpanded,
    /// Rows collapsed to null on an axis
    ExposureCollapsed,
    /// Per-culture or per-segment values collapsed into invariant values
    ValuesCollapsed,

    // Publish / deploy
    /// Publish projection produced
    ValueProjected,
    /// Value converted to a deploy artifact
    ArtifactExported,
    /// Value restored from a deploy artifact
    ArtifactImported,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::ValueAccepted => "VALUE_ACCEPTED",
            Event::ValueRejected => "VALUE_REJECTED",

            Event::BatchCommitted => "BATCH_COMMITTED",
            Event::BatchRejected => "BATCH_REJECTED",
            Event::OrphanCollected => "ORPHAN_COLLECTED",

            Event::BlockInserted => "BLOCK_INSERTED",
            Event::ExposureWithdrawn => "EXPOSURE_WITHDRAWN",
            Event::BlockRemoved => "BLOCK_REMOVED",

            Event::ExposureExpanded => "EXPOSURE_EXPANDED",
            Event::ExposureCollapsed => "EXPOSURE_COLLAPSED",
            Event::ValuesCollapsed => "VALUES_COLLAPSED",

            Event::ValueProjected => "VALUE_PROJECTED",
            Event::ArtifactExported => "ARTIFACT_EXPORTED",
            Event::ArtifactImported => "ARTIFACT_IMPORTED",
        }
    }

    /// Returns true if the event reports something an editor should be warned about
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::OrphanCollected | Event::ValuesCollapsed)
    }

    /// Returns true if the event reports a rejected operation
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::ValueRejected | Event::BatchRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
