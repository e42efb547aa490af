//! Value connector boundary
//!
//! A connector turns a stored property value into an environment-agnostic
//! artifact string plus the dependencies the target environment must
//! provide, and back. Block values only reference element types from
//! outside; block keys are local to the value and travel unchanged.

mod block;

pub use block::BlockValueConnector;

use serde::{Deserialize, Serialize};

use crate::model::{BlockResult, BlockValue, EditorAlias};

/// How a dependency must be satisfied in the target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactDependencyMode {
    /// Must exist and be identical.
    Match,
    /// Must exist.
    Exist,
}

/// An entity the artifact depends on, identified by UDI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactDependency {
    pub udi: String,
    /// Deploy the dependency before the dependent artifact.
    pub ordering: bool,
    pub mode: ArtifactDependencyMode,
}

impl ArtifactDependency {
    pub fn new(udi: impl Into<String>, ordering: bool, mode: ArtifactDependencyMode) -> Self {
        Self {
            udi: udi.into(),
            ordering,
            mode,
        }
    }
}

/// Converts property values to and from deploy artifacts.
pub trait ValueConnector {
    /// Editor aliases this connector handles.
    fn property_editor_aliases(&self) -> Vec<EditorAlias>;

    /// Artifact string for `value`, appending what it depends on.
    /// `None` means the property has no value.
    fn to_artifact(
        &self,
        value: Option<&BlockValue>,
        dependencies: &mut Vec<ArtifactDependency>,
    ) -> BlockResult<Option<String>>;

    /// Property value for `artifact`. `current` is the value the target
    /// property holds now.
    fn from_artifact(&self, artifact: Option<&str>, current: Option<&BlockValue>) -> BlockResult<Option<BlockValue>>;
}
