//! Loading raw dimension configuration from disk
//!
//! Supported formats, chosen by file extension:
//! - `.yaml` / `.yml` (serde_yaml)
//! - `.toml` (toml)
//! - `.json` (serde_json)
//!
//! The dimension map may sit at the top level or under a `dimensions` key.
//! Key order is preserved, so declaration order stays the priority order.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use super::ConfigurationDimensionSource;

const DIMENSIONS_KEY: &str = "dimensions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

/// Parses configuration text into the raw dimension map
pub fn parse_raw_configuration(content: &str, format: ConfigFormat) -> Result<Value, ConfigError> {
    let document: Value = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
        }
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?,
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
        }
    };

    Ok(unwrap_dimensions(document))
}

/// Reads and parses a configuration file
pub fn load_raw_configuration(path: &Path) -> Result<Value> {
    let format = ConfigFormat::from_path(path)
        .with_context(|| format!("Cannot load dimension configuration: {}", path.display()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dimension configuration: {}", path.display()))?;

    tracing::debug!(path = %path.display(), format = format.as_str(), "loading dimension configuration");

    parse_raw_configuration(&content, format)
        .with_context(|| format!("Failed to parse dimension configuration: {}", path.display()))
}

/// Loads a file and builds the dimension source from it
pub fn load_dimension_source(path: &Path) -> Result<ConfigurationDimensionSource> {
    let raw = load_raw_configuration(path)?;
    ConfigurationDimensionSource::new(&raw)
        .with_context(|| format!("Invalid dimension configuration: {}", path.display()))
}

/// `{dimensions: {...}}` wraps the map unless `dimensions` is itself a dimension
///
/// The wrapper is only recognized when every inner entry is a map (or empty),
/// i.e. looks like a dimension definition. A dimension named `dimensions`
/// whose keys are all maps of opaque configuration is still read as a wrapper.
fn unwrap_dimensions(document: Value) -> Value {
    match document {
        Value::Object(mut map) => {
            let wrapped = map.len() == 1
                && map
                    .get(DIMENSIONS_KEY)
                    .and_then(Value::as_object)
                    .map(is_dimension_map)
                    .unwrap_or(false);
            if wrapped {
                map.remove(DIMENSIONS_KEY).unwrap_or(Value::Null)
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

fn is_dimension_map(inner: &serde_json::Map<String, Value>) -> bool {
    !inner.contains_key("values")
        && !inner.contains_key("defaultValue")
        && inner.values().all(|v| v.is_object() || v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DimensionId;
    use crate::source::DimensionSource;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const YAML: &str = r#"
region:
  defaultValue: US
  values:
    US:
      specializations:
        CA:
language:
  defaultValue: en
  values:
    en:
      constraints:
        region:
          CA: false
      specializations:
        de: {}
"#;

    #[test]
    fn format_detection() {
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.yaml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(&PathBuf::from("a.ini")).is_err());
        assert!(ConfigFormat::from_path(&PathBuf::from("noext")).is_err());
    }

    #[test]
    fn yaml_preserves_declaration_order() {
        let raw = parse_raw_configuration(YAML, ConfigFormat::Yaml).unwrap();
        let source = ConfigurationDimensionSource::new(&raw).unwrap();

        let ids: Vec<_> = source
            .dimensions_by_priority()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["region", "language"]);

        let region = source.dimension(&DimensionId::new("region").unwrap()).unwrap();
        assert_eq!(region.generalization("CA").unwrap().value(), "US");
    }

    #[test]
    fn toml_with_dimensions_wrapper() {
        let toml = r#"
[dimensions.language]
defaultValue = "en"

[dimensions.language.values.en.specializations.de]

[dimensions.channel]
defaultValue = "web"

[dimensions.channel.values.web]
[dimensions.channel.values.app]
"#;
        let raw = parse_raw_configuration(toml, ConfigFormat::Toml).unwrap();
        let source = ConfigurationDimensionSource::new(&raw).unwrap();

        let ids: Vec<_> = source
            .dimensions_by_priority()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["language", "channel"]);
    }

    #[test]
    fn dimension_named_dimensions_is_not_unwrapped() {
        let json = r#"{"dimensions": {"defaultValue": "a", "values": {"a": {}}}}"#;
        let raw = parse_raw_configuration(json, ConfigFormat::Json).unwrap();
        let source = ConfigurationDimensionSource::new(&raw).unwrap();
        assert_eq!(source.dimensions_by_priority().len(), 1);
        assert_eq!(source.dimensions_by_priority()[0].id().as_str(), "dimensions");
    }

    #[test]
    fn marker_dimension_named_dimensions_is_not_unwrapped() {
        let yaml = "dimensions:\n  label: Marker\n";
        let raw = parse_raw_configuration(yaml, ConfigFormat::Yaml).unwrap();
        let source = ConfigurationDimensionSource::new(&raw).unwrap();

        let dimensions = source.dimensions_by_priority();
        assert_eq!(dimensions.len(), 1);
        assert!(dimensions[0].is_empty());
        assert_eq!(
            dimensions[0].configuration_value("label"),
            Some(&serde_json::json!("Marker"))
        );
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dimensions.yaml");
        fs::write(&path, YAML).unwrap();

        let source = load_dimension_source(&path).unwrap();
        assert_eq!(source.dimensions_by_priority().len(), 2);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "language:\n  values:\n    en: {}\n").unwrap();

        let err = load_dimension_source(&path).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("broken.yaml"));
        assert!(message.contains("defaultValue"));
    }
}
