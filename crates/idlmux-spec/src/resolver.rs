use crate::registry::{Registry, ResolveError, SymbolEntry, SymbolKind};
use crate::types::common::is_builtin_scalar;
use crate::types::definitions::FieldType;
use crate::types::error::{
    ErrorEntry, E_AMBIGUOUS_SYMBOL, E_UNKNOWN_SYMBOL, E_UNRESOLVED_QUALIFIED_NAME,
};

/// Reference resolver producing report entries for failed lookups.
///
/// Builtin scalars are accepted without touching the registry.
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Resolve a declared-type reference and convert failures to an ErrorEntry.
    #[allow(clippy::result_large_err)]
    pub fn resolve_or_error(
        &self,
        name: &str,
        current_namespace: &str,
        file: &str,
        path: &str,
    ) -> Result<&'a SymbolEntry, ErrorEntry> {
        self.registry
            .resolve(name, current_namespace)
            .map_err(|err| resolve_error_entry(&err, file, path))
    }

    /// Check every name a field type mentions. Scalars always pass.
    pub fn check_field_type(
        &self,
        field_type: &FieldType,
        current_namespace: &str,
        file: &str,
        path: &str,
    ) -> Vec<ErrorEntry> {
        field_type
            .referenced_names()
            .into_iter()
            .filter(|name| !is_builtin_scalar(name))
            .filter_map(|name| {
                self.resolve_or_error(name, current_namespace, file, path)
                    .err()
            })
            .collect()
    }

    /// Resolve a reference that must name a Type (method payloads, union options).
    #[allow(clippy::result_large_err)]
    pub fn resolve_object(
        &self,
        name: &str,
        current_namespace: &str,
        file: &str,
        path: &str,
    ) -> Result<&'a SymbolEntry, ErrorEntry> {
        let entry = self.resolve_or_error(name, current_namespace, file, path)?;
        if entry.kind == SymbolKind::Enum {
            return Err(ErrorEntry::error(
                E_UNKNOWN_SYMBOL,
                format!(
                    "'{}' resolves to enum '{}' where an object type is required",
                    name, entry.qualified
                ),
                file,
                path,
            )
            .with_suggestion("Reference a type or union here"));
        }
        Ok(entry)
    }
}

/// Convert a registry failure into a report entry with a fix-up hint.
pub fn resolve_error_entry(err: &ResolveError, file: &str, path: &str) -> ErrorEntry {
    match err {
        ResolveError::UnresolvedQualifiedName { name } => ErrorEntry::error(
            E_UNRESOLVED_QUALIFIED_NAME,
            format!("Qualified name '{name}' is not declared"),
            file,
            path,
        )
        .with_suggestion(format!(
            "Declare '{name}' or check the namespace part of the reference"
        )),
        ResolveError::UnknownSymbol { name, namespace } => ErrorEntry::error(
            E_UNKNOWN_SYMBOL,
            format!("Unknown type '{name}' referenced from namespace '{namespace}'"),
            file,
            path,
        )
        .with_suggestion(format!("Declare '{name}' or fix the reference")),
        ResolveError::AmbiguousSymbol { name, candidates } => ErrorEntry::error(
            E_AMBIGUOUS_SYMBOL,
            format!(
                "Reference '{name}' is ambiguous: found {}",
                candidates.join(", ")
            ),
            file,
            path,
        )
        .with_suggestion(format!(
            "Use a fully qualified name, e.g. '{}'",
            candidates.first().map(String::as_str).unwrap_or(name)
        )),
    }
}
