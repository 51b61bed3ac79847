use idlmux_spec::registry::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("duplicate schema name `{name}` found in namespaces: {}", .namespaces.join(", "))]
    DuplicateSymbol { name: String, namespaces: Vec<String> },

    #[error("invalid route path `{0}`: {1}")]
    InvalidPath(String, String),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
