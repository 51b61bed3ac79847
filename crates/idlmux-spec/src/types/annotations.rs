use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::Target;

/// Documentation attached to a declaration.
///
/// A per-target entry replaces the general text for that target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Documentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub specific: IndexMap<Target, String>,
}

impl Documentation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            general: Some(text.into()),
            specific: IndexMap::new(),
        }
    }

    /// Text to render for `target`, if any.
    pub fn for_target(&self, target: Target) -> Option<&str> {
        self.specific
            .get(&target)
            .or(self.general.as_ref())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Per-target name override and raw option strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TargetAnnotations {
    /// Name to emit instead of the declared name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Proto options, GraphQL directives, or OpenAPI extension objects (JSON)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl TargetAnnotations {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.options.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FormatAnnotations {
    #[serde(default, skip_serializing_if = "TargetAnnotations::is_empty")]
    pub proto: TargetAnnotations,
    #[serde(default, skip_serializing_if = "TargetAnnotations::is_empty")]
    pub graphql: TargetAnnotations,
    #[serde(default, skip_serializing_if = "TargetAnnotations::is_empty")]
    pub openapi: TargetAnnotations,
}

impl FormatAnnotations {
    pub fn for_target(&self, target: Target) -> &TargetAnnotations {
        match target {
            Target::Protobuf => &self.proto,
            Target::Graphql => &self.graphql,
            Target::OpenApi => &self.openapi,
        }
    }

    /// Name override for `target`, ignoring blank strings.
    pub fn name_for(&self, target: Target) -> Option<&str> {
        self.for_target(target)
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }

    pub fn options_for(&self, target: Target) -> &[String] {
        &self.for_target(target).options
    }
}

/// Deprecation notice for a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeprecationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<String>,
}

impl DeprecationInfo {
    /// `(since X) - will be removed in Y`, each part only when set.
    pub fn version_note(&self) -> String {
        let mut note = String::new();
        if let Some(since) = &self.since {
            note.push_str(&format!(" (since {since})"));
        }
        if let Some(removed) = &self.removed {
            note.push_str(&format!(" - will be removed in {removed}"));
        }
        note
    }
}

/// Validation constraints carried into targets that can express them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// email, uuid, uri, url, hostname, ipv4, ipv6, date, date-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}
