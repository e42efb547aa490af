//! Connector for block list, block grid and rich text values

use std::collections::BTreeSet;

use crate::integrity::validate_references;
use crate::model::{BlockResult, BlockValue, ContentTypeKey, EditorAlias};
use crate::observability::{log_event, Event};

use super::{ArtifactDependency, ArtifactDependencyMode, ValueConnector};

/// Artifact form is the canonical JSON wire form. Each element type used by
/// a content or settings record becomes one `Match` dependency.
#[derive(Debug, Clone, Default)]
pub struct BlockValueConnector;

impl BlockValueConnector {
    pub fn new() -> Self {
        Self
    }

    /// Element types referenced by the value, sorted.
    pub fn element_types(value: &BlockValue) -> BTreeSet<ContentTypeKey> {
        value
            .content
            .records()
            .iter()
            .chain(value.settings.records())
            .map(|r| r.content_type_key)
            .collect()
    }
}

impl ValueConnector for BlockValueConnector {
    fn property_editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::BlockList, EditorAlias::BlockGrid, EditorAlias::RichText]
    }

    fn to_artifact(
        &self,
        value: Option<&BlockValue>,
        dependencies: &mut Vec<ArtifactDependency>,
    ) -> BlockResult<Option<String>> {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(None),
        };

        let types = Self::element_types(value);
        for type_key in &types {
            let dependency = ArtifactDependency::new(type_key.udi(), false, ArtifactDependencyMode::Match);
            if !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        }

        let artifact = value.to_json()?;
        let count = types.len().to_string();
        log_event(Event::ArtifactExported, &[("dependencies", count.as_str())]);
        Ok(Some(artifact))
    }

    fn from_artifact(&self, artifact: Option<&str>, _current: Option<&BlockValue>) -> BlockResult<Option<BlockValue>> {
        let artifact = match artifact.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(None),
        };

        let value = BlockValue::from_json(artifact)?;
        validate_references(&value)?;

        let records = (value.content.len() + value.settings.len()).to_string();
        log_event(Event::ArtifactImported, &[("records", records.as_str())]);
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockItemData, BlockKey, ExposeEntry, LayoutItem};

    fn value_with(types: &[ContentTypeKey]) -> BlockValue {
        let mut value = BlockValue::new();
        for type_key in types {
            let key = BlockKey::new_v4();
            let settings = BlockKey::new_v4();
            value.content.insert(BlockItemData::new(key, *type_key, "headline")).unwrap();
            value.settings.insert(BlockItemData::new(settings, *type_key, "headline")).unwrap();
            value.layout.append(&EditorAlias::BlockList, LayoutItem::list(key, Some(settings)));
            value.expose.add(ExposeEntry::new(key, None, None));
        }
        value
    }

    #[test]
    fn test_dependencies_are_element_types() {
        let shared = ContentTypeKey::new_v4();
        let value = value_with(&[shared, shared, ContentTypeKey::new_v4()]);
        let mut deps = Vec::new();

        let artifact = BlockValueConnector::new().to_artifact(Some(&value), &mut deps).unwrap();
        assert!(artifact.is_some());
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.mode == ArtifactDependencyMode::Match));
        assert!(deps.iter().any(|d| d.udi == shared.udi()));
    }

    #[test]
    fn test_artifact_restores_value() {
        let value = value_with(&[ContentTypeKey::new_v4()]);
        let connector = BlockValueConnector::new();
        let artifact = connector.to_artifact(Some(&value), &mut Vec::new()).unwrap();

        let restored = connector.from_artifact(artifact.as_deref(), None).unwrap();
        assert_eq!(restored, Some(value));
    }

    #[test]
    fn test_empty_value_has_no_artifact() {
        let connector = BlockValueConnector::new();
        let mut deps = Vec::new();
        assert_eq!(connector.to_artifact(Some(&BlockValue::new()), &mut deps).unwrap(), None);
        assert_eq!(connector.to_artifact(None, &mut deps).unwrap(), None);
        assert!(deps.is_empty());
        assert_eq!(connector.from_artifact(Some("  "), None).unwrap(), None);
    }

    #[test]
    fn test_dangling_artifact_rejected() {
        let connector = BlockValueConnector::new();
        let ghost = BlockKey::new_v4();
        let artifact = format!(
            r#"{{"layout":{{"Umbraco.BlockList":[{{"contentKey":"{}"}}]}},"contentData":[],"settingsData":[],"expose":[]}}"#,
            ghost
        );
        assert!(connector.from_artifact(Some(&artifact), None).is_err());
    }
}
