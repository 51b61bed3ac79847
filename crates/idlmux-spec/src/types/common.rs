use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Schema language a model is translated into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Target {
    /// Protocol Buffers 3 (tagged-variant target)
    #[serde(rename = "proto")]
    Protobuf,
    /// GraphQL SDL (declarative-disjunction target)
    #[serde(rename = "graphql")]
    Graphql,
    /// OpenAPI 3.0 (discriminator-schema target)
    #[serde(rename = "openapi")]
    OpenApi,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Protobuf, Target::Graphql, Target::OpenApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Protobuf => "proto",
            Target::Graphql => "graphql",
            Target::OpenApi => "openapi",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proto" | "protobuf" => Ok(Target::Protobuf),
            "graphql" | "gql" => Ok(Target::Graphql),
            "openapi" | "oas" => Ok(Target::OpenApi),
            other => Err(format!(
                "unknown target '{other}', expected one of: proto, graphql, openapi"
            )),
        }
    }
}

/// HTTP methods a service method can be exposed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Whether requests with this method carry a body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// GraphQL root operation a method is exposed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Scalar names every target knows how to spell.
pub const BUILTIN_SCALARS: &[&str] = &[
    "string",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "float32",
    "float64",
    "bool",
    "timestamp",
    "bytes",
];

/// Whether `name` is a builtin scalar (never looked up in the registry).
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_serialization() {
        assert_eq!(serde_json::to_value(Target::Protobuf).unwrap(), "proto");
        assert_eq!(serde_json::to_value(Target::Graphql).unwrap(), "graphql");
        assert_eq!(serde_json::to_value(Target::OpenApi).unwrap(), "openapi");

        let t: Target = serde_json::from_str("\"openapi\"").unwrap();
        assert_eq!(t, Target::OpenApi);
    }

    #[test]
    fn test_target_from_str_aliases() {
        assert_eq!("protobuf".parse::<Target>().unwrap(), Target::Protobuf);
        assert_eq!("GraphQL".parse::<Target>().unwrap(), Target::Graphql);
        assert!("thrift".parse::<Target>().is_err());
    }

    #[test]
    fn test_http_method_body() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Patch.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn test_builtin_scalars() {
        assert!(is_builtin_scalar("timestamp"));
        assert!(is_builtin_scalar("uint8"));
        assert!(!is_builtin_scalar("User"));
        assert!(!is_builtin_scalar("String"));
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_value(Severity::Error).unwrap(), "error");
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), "warning");
    }
}
