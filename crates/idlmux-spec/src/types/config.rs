use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::Target;

/// Generator configuration (idlmux.config.json / idlmux.config.yaml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub proto: ProtoConfig,

    #[serde(default)]
    pub openapi: OpenApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub directory: String,

    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,

    /// Per-target output file name overrides
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filenames: IndexMap<Target, String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_out_dir(),
            targets: default_targets(),
            filenames: IndexMap::new(),
        }
    }
}

fn default_out_dir() -> String {
    "generated".to_string()
}

fn default_targets() -> Vec<Target> {
    Target::ALL.to_vec()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProtoConfig {
    /// Emit one `.proto` file per namespace instead of a single file
    #[serde(default)]
    pub split_by_namespace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiConfig {
    #[serde(default = "default_openapi_version")]
    pub version: String,

    #[serde(default)]
    pub format: DocumentFormat,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            version: default_openapi_version(),
            format: DocumentFormat::default(),
        }
    }
}

fn default_openapi_version() -> String {
    "3.0.0".to_string()
}

/// Serialization format of a structured output document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
        }
    }
}
