use std::path::Path;

use crate::types::config::{DocumentFormat, GeneratorConfig};
use crate::types::definitions::Schema;
use crate::types::error::{ErrorEntry, E_PARSE_ERROR};

/// Model document file kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFileType {
    Model(DocumentFormat),
    Config(DocumentFormat),
}

/// Detect a model or config document from its file name.
pub fn detect_file_type(file_path: &Path) -> Option<ModelFileType> {
    let name = file_path.file_name()?.to_str()?;
    match name {
        "idlmux.config.json" => return Some(ModelFileType::Config(DocumentFormat::Json)),
        "idlmux.config.yaml" | "idlmux.config.yml" => {
            return Some(ModelFileType::Config(DocumentFormat::Yaml))
        }
        _ => {}
    }
    if name.ends_with(".idl.json") {
        Some(ModelFileType::Model(DocumentFormat::Json))
    } else if name.ends_with(".idl.yaml") || name.ends_with(".idl.yml") {
        Some(ModelFileType::Model(DocumentFormat::Yaml))
    } else {
        None
    }
}

/// Format of a standalone document, by extension.
pub fn detect_format(file_path: &Path) -> Option<DocumentFormat> {
    match file_path.extension()?.to_str()? {
        "json" => Some(DocumentFormat::Json),
        "yaml" | "yml" => Some(DocumentFormat::Yaml),
        _ => None,
    }
}

/// Parse document text into a generic JSON value.
#[allow(clippy::result_large_err)]
pub fn parse_value(
    content: &str,
    file_path: &str,
    format: DocumentFormat,
) -> Result<serde_json::Value, ErrorEntry> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| json_error_to_entry(e, file_path))
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| yaml_error_to_entry(e, file_path))
        }
    }
}

/// Deserialize a model from an already-parsed value.
#[allow(clippy::result_large_err)]
pub fn model_from_value(value: serde_json::Value, file_path: &str) -> Result<Schema, ErrorEntry> {
    serde_json::from_value(value).map_err(|e| json_error_to_entry(e, file_path))
}

/// Parse a model document.
#[allow(clippy::result_large_err)]
pub fn parse_model(
    content: &str,
    file_path: &str,
    format: DocumentFormat,
) -> Result<Schema, ErrorEntry> {
    let value = parse_value(content, file_path, format)?;
    model_from_value(value, file_path)
}

/// Parse an idlmux.config file
#[allow(clippy::result_large_err)]
pub fn parse_config(
    content: &str,
    file_path: &str,
    format: DocumentFormat,
) -> Result<GeneratorConfig, ErrorEntry> {
    let value = parse_value(content, file_path, format)?;
    serde_json::from_value(value).map_err(|e| json_error_to_entry(e, file_path))
}

/// Convert a serde_json error into a structured ErrorEntry
fn json_error_to_entry(err: serde_json::Error, file_path: &str) -> ErrorEntry {
    let line = err.line();
    let col = err.column();
    let path = format!("$.line:{line}:col:{col}");

    ErrorEntry::error(
        E_PARSE_ERROR,
        format!("JSON parse error: {err}"),
        file_path,
        &path,
    )
    .with_suggestion("Check JSON syntax and field types")
}

fn yaml_error_to_entry(err: serde_yaml::Error, file_path: &str) -> ErrorEntry {
    let path = match err.location() {
        Some(loc) => format!("$.line:{}:col:{}", loc.line(), loc.column()),
        None => "$".to_string(),
    };

    ErrorEntry::error(
        E_PARSE_ERROR,
        format!("YAML parse error: {err}"),
        file_path,
        &path,
    )
    .with_suggestion("Check YAML indentation and field types")
}
