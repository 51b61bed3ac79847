use idlmux_ir::NumberingCollision;
use idlmux_openapi::OpenApiError;
use idlmux_spec::registry::ResolveError;
use idlmux_spec::resolver::resolve_error_entry;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::error::{
    ErrorEntry, E_DUPLICATE_SYMBOL, E_EMIT_FAILED, E_NUMBERING_COLLISION,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("duplicate type name '{name}' found in namespaces: {}", .namespaces.join(", "))]
    DuplicateSymbol { name: String, namespaces: Vec<String> },

    #[error("numbering collision: {0}")]
    NumberingCollision(#[from] NumberingCollision),

    #[error("openapi export failed: {0}")]
    OpenApi(OpenApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OpenApiError> for CodegenError {
    fn from(err: OpenApiError) -> Self {
        match err {
            OpenApiError::Resolve(err) => CodegenError::Resolve(err),
            OpenApiError::DuplicateSymbol { name, namespaces } => {
                CodegenError::DuplicateSymbol { name, namespaces }
            }
            other => CodegenError::OpenApi(other),
        }
    }
}

impl CodegenError {
    /// Whether the failed target still gets a diagnostic document.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, CodegenError::DuplicateSymbol { .. })
    }

    /// Report entry for a failure while emitting `target`.
    pub fn to_entry(&self, target: Target) -> ErrorEntry {
        let path = "$";
        match self {
            CodegenError::Resolve(err) => {
                let mut entry = resolve_error_entry(err, "", path);
                entry.message = format!("{target}: {}", entry.message);
                entry
            }
            CodegenError::DuplicateSymbol { name, .. } => {
                ErrorEntry::error(E_DUPLICATE_SYMBOL, format!("{target}: {self}"), "", path)
                    .with_suggestion(format!(
                        "Rename one of the '{name}' declarations or give it a {target} name override"
                    ))
            }
            CodegenError::NumberingCollision(_) => {
                ErrorEntry::error(E_NUMBERING_COLLISION, format!("{target}: {self}"), "", path)
            }
            CodegenError::OpenApi(_) | CodegenError::Io(_) => {
                ErrorEntry::error(E_EMIT_FAILED, format!("{target}: {self}"), "", path)
            }
        }
    }
}
