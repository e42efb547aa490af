//! CLI command implementations
//!
//! Each command loads the configuration, reads one value from stdin and
//! answers with one JSON object on stdout. The `*_value` functions hold the
//! command logic without touching stdin or stdout.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::connector::{BlockValueConnector, ValueConnector};
use crate::integrity::{find_orphans, BlockValueValidator};
use crate::model::{BlockValue, ContentTypeKey};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::publish::{project, PublishCultures};
use crate::reconcile::{ReconcileReport, ReconcileWarning, Reconciler};
use crate::variation::{ElementTypeVariation, PropertyVariation, StaticVariationMetadata, VariationConfig};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cultures of the content item, in the order they were added
    #[serde(default)]
    pub cultures: Vec<String>,

    /// Default culture (optional, must be one of `cultures`)
    #[serde(default)]
    pub default_culture: Option<String>,

    /// Segments of the content item
    #[serde(default)]
    pub segments: Vec<String>,

    /// Variation of the owning property (default: invariant)
    #[serde(default)]
    pub owner: OwnerConfig,

    /// Element types records may use
    #[serde(default)]
    pub element_types: Vec<ElementTypeConfig>,
}

/// Variation flags of the owning property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OwnerConfig {
    #[serde(default)]
    pub varies_by_culture: bool,
    #[serde(default)]
    pub varies_by_segment: bool,
}

/// One element type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementTypeConfig {
    pub key: ContentTypeKey,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub varies_by_culture: bool,
    #[serde(default)]
    pub varies_by_segment: bool,
    /// Properties that stay invariant while the type varies
    #[serde(default)]
    pub invariant_properties: Vec<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let cultures = config.cultures.len().to_string();
        let element_types = config.element_types.len().to_string();
        log_event(
            Event::ConfigLoaded,
            &[("cultures", cultures.as_str()), ("element_types", element_types.as_str())],
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        let mut seen = HashSet::new();
        for culture in &self.cultures {
            if culture.trim().is_empty() || culture == "*" {
                return Err(CliError::config_error(format!("Invalid culture code: '{}'", culture)));
            }
            if !seen.insert(culture.as_str()) {
                return Err(CliError::config_error(format!("Duplicate culture: '{}'", culture)));
            }
        }

        let mut seen = HashSet::new();
        for segment in &self.segments {
            if !seen.insert(segment.as_str()) {
                return Err(CliError::config_error(format!("Duplicate segment: '{}'", segment)));
            }
        }

        if let Some(default) = &self.default_culture {
            if !self.cultures.contains(default) {
                return Err(CliError::config_error(format!(
                    "default_culture '{}' is not one of the configured cultures",
                    default
                )));
            }
        }

        if self.owner.varies_by_culture && self.cultures.is_empty() {
            return Err(CliError::config_error(
                "owner varies by culture but no cultures are configured",
            ));
        }
        if self.owner.varies_by_segment && self.segments.is_empty() {
            return Err(CliError::config_error(
                "owner varies by segment but no segments are configured",
            ));
        }

        let mut seen = HashSet::new();
        for element_type in &self.element_types {
            if !seen.insert(element_type.key) {
                return Err(CliError::config_error(format!(
                    "Duplicate element type: {}",
                    element_type.key
                )));
            }
        }

        Ok(())
    }

    /// Variation of the owning property
    pub fn owner(&self) -> PropertyVariation {
        PropertyVariation::new(self.owner.varies_by_culture, self.owner.varies_by_segment)
    }

    /// Element-type metadata table
    pub fn to_metadata(&self) -> StaticVariationMetadata {
        let mut metadata = StaticVariationMetadata::new();
        for element_type in &self.element_types {
            let mut variation =
                ElementTypeVariation::new(element_type.varies_by_culture, element_type.varies_by_segment);
            for alias in &element_type.invariant_properties {
                variation = variation.with_invariant_property(alias.as_str());
            }
            metadata.register(element_type.key, variation);
        }
        metadata
    }

    /// Configured cultures and segments
    pub fn to_variation_config(&self) -> VariationConfig {
        VariationConfig {
            cultures: self.cultures.clone(),
            default_culture: self.default_culture.clone(),
            segments: self.segments.clone(),
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        if e.is_rejection() {
            write_error(e.code_str(), e.message())?;
        }
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Validate { config } => validate(&config),
        Command::Project { config, cultures } => project_cmd(&config, &cultures),
        Command::Reconcile {
            config,
            varies_by_culture,
            varies_by_segment,
        } => reconcile(&config, varies_by_culture, varies_by_segment),
        Command::Artifact { config, import } => artifact(&config, import),
    }
}

/// Validate a value read from stdin
pub fn validate(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data = validate_value(&config, read_request()?)?;
    write_response(data)
}

/// Project a value read from stdin for `cultures`
pub fn project_cmd(config_path: &Path, cultures: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let metrics = MetricsRegistry::new();
    let data = project_value(&config, read_request()?, &PublishCultures::parse(cultures), &metrics)?;
    write_response(data)
}

/// Reconcile a value read from stdin
pub fn reconcile(
    config_path: &Path,
    varies_by_culture: Option<bool>,
    varies_by_segment: Option<bool>,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let before = config.owner();
    let after = PropertyVariation::new(
        varies_by_culture.unwrap_or(before.varies_by_culture),
        varies_by_segment.unwrap_or(before.varies_by_segment),
    );
    let metrics = MetricsRegistry::new();
    let data = reconcile_value(&config, read_request()?, after, &metrics)?;
    write_response(data)
}

/// Export a value read from stdin, or import an artifact string
pub fn artifact(config_path: &Path, import: bool) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let request = read_request()?;
    let data = if import {
        import_artifact(&config, request)?
    } else {
        export_artifact(&config, request)?
    };
    write_response(data)
}

// ============================================================================
// Command logic
// ============================================================================

/// Decodes and fully validates a value.
pub fn decode_valid(config: &Config, request: Value) -> CliResult<BlockValue> {
    let value = BlockValue::from_json_value(request)?;
    let metadata = config.to_metadata();
    let validator = BlockValueValidator::new(&metadata, config.owner());

    match validator.validate(&value) {
        Ok(()) => {
            let records = (value.content.len() + value.settings.len()).to_string();
            log_event(Event::ValueAccepted, &[("records", records.as_str())]);
            Ok(value)
        }
        Err(e) => {
            let key = e.key().map(|k| k.to_string()).unwrap_or_default();
            log_event(
                Event::ValueRejected,
                &[("code", e.code().code()), ("key", key.as_str())],
            );
            Err(e.into())
        }
    }
}

pub fn validate_value(config: &Config, request: Value) -> CliResult<Value> {
    let value = decode_valid(config, request)?;
    let orphans: Vec<Value> = find_orphans(&value)
        .into_iter()
        .map(|(store, key)| json!({"store": store.to_string(), "key": key.to_string()}))
        .collect();

    Ok(json!({
        "content": value.content.len(),
        "settings": value.settings.len(),
        "expose": value.expose.len(),
        "orphans": orphans,
    }))
}

pub fn project_value(
    config: &Config,
    request: Value,
    cultures: &PublishCultures,
    metrics: &MetricsRegistry,
) -> CliResult<Value> {
    let value = decode_valid(config, request)?;
    let published = project(&value, cultures);
    metrics.increment_projections();

    let retained = published.content.len().to_string();
    let requested: Vec<&str> = cultures.cultures().collect();
    let requested = requested.join(",");
    log_event(
        Event::ValueProjected,
        &[("cultures", requested.as_str()), ("retained", retained.as_str())],
    );

    Ok(published.to_json_value()?)
}

pub fn reconcile_value(
    config: &Config,
    request: Value,
    after: PropertyVariation,
    metrics: &MetricsRegistry,
) -> CliResult<Value> {
    // Element types may already disagree with the stored values, so only
    // the structure is checked up front
    let mut value = BlockValue::from_json_value(request)?;
    let metadata = config.to_metadata();
    let variation = config.to_variation_config();

    let reconciler = Reconciler::new(&metadata, config.owner(), &variation).with_metrics(metrics);
    let report = reconciler.reconcile_variation(&mut value, after)?;

    Ok(json!({
        "value": value.to_json_value()?,
        "report": report_json(&report),
        "metrics": metrics.to_json(),
    }))
}

pub fn export_artifact(config: &Config, request: Value) -> CliResult<Value> {
    let value = decode_valid(config, request)?;
    let mut dependencies = Vec::new();
    let artifact = BlockValueConnector::new().to_artifact(Some(&value), &mut dependencies)?;

    Ok(json!({
        "artifact": artifact,
        "dependencies": serde_json::to_value(&dependencies)?,
    }))
}

pub fn import_artifact(config: &Config, request: Value) -> CliResult<Value> {
    let artifact = match &request {
        Value::String(text) => Some(text.as_str()),
        Value::Null => None,
        _ => return Err(CliError::io_error("Expected the artifact as a JSON string")),
    };

    match BlockValueConnector::new().from_artifact(artifact, None)? {
        Some(value) => {
            let value = decode_valid(config, value.to_json_value()?)?;
            Ok(value.to_json_value()?)
        }
        None => Ok(Value::Null),
    }
}

fn report_json(report: &ReconcileReport) -> Value {
    let warnings: Vec<Value> = report
        .warnings
        .iter()
        .map(|warning| match warning {
            ReconcileWarning::OrphanRecord(orphan) => json!({
                "kind": "orphan_record",
                "store": orphan.store.to_string(),
                "key": orphan.key.to_string(),
                "expose_rows": orphan.expose_rows,
            }),
            ReconcileWarning::ValuesCollapsed {
                store,
                key,
                axis,
                survivor,
                discarded,
            } => json!({
                "kind": "values_collapsed",
                "store": store.to_string(),
                "key": key.to_string(),
                "axis": axis.as_str(),
                "survivor": survivor,
                "discarded": discarded,
            }),
        })
        .collect();

    json!({
        "exposure_added": report.exposure_added,
        "exposure_removed": report.exposure_removed,
        "removed_blocks": report.removed_blocks.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
        "warnings": warnings,
    })
}
