use idlmux_spec::registry::SymbolEntry;
use idlmux_spec::types::common::is_builtin_scalar;
use idlmux_spec::types::definitions::{FieldType, TypeShape};
use idlmux_spec::types::error::{ErrorEntry, E_UNKNOWN_VALUE_TYPE};

use crate::scope::RenderScope;

/// What a map's value turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapValue<'a> {
    Scalar(&'a str),
    Declared(&'a SymbolEntry),
    Map { key: &'a str, value: &'a FieldType },
    Array(&'a FieldType),
    /// A name that neither is a scalar nor resolves
    Unknown(&'a str),
}

/// Classify a map value shape within `scope`.
pub fn classify_value<'a>(value: &'a FieldType, scope: &RenderScope<'a>) -> MapValue<'a> {
    match &value.shape {
        TypeShape::Named { name } if is_builtin_scalar(name) => MapValue::Scalar(name),
        TypeShape::Named { name } => match scope.resolve(name) {
            Ok(entry) => MapValue::Declared(entry),
            Err(_) => MapValue::Unknown(name),
        },
        TypeShape::Map { key, value } => MapValue::Map { key, value },
        TypeShape::Array { items } => MapValue::Array(items),
    }
}

/// String encoding of a value shape: `map<K,SIG(V)>`, `[SIG(T)]`, or the name.
/// Structurally identical nested maps share a signature.
pub fn structural_signature(ft: &FieldType) -> String {
    match &ft.shape {
        TypeShape::Named { name } => name.clone(),
        TypeShape::Array { items } => format!("[{}]", structural_signature(items)),
        TypeShape::Map { key, value } => format!("map<{key},{}>", structural_signature(value)),
    }
}

/// Non-fatal diagnostics collected while synthesizing map types.
#[derive(Debug, Clone, Default)]
pub struct MapWarnings {
    entries: Vec<ErrorEntry>,
}

impl MapWarnings {
    pub fn unknown_value(&mut self, shape: &str, namespace: &str) {
        tracing::warn!(shape, namespace, "map value type degraded to placeholder");
        self.entries.push(
            ErrorEntry::warning(
                E_UNKNOWN_VALUE_TYPE,
                format!("Map value type '{shape}' could not be classified; emitted a placeholder"),
                "",
                namespace,
            )
            .with_suggestion("Declare the value type or use a scalar"),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn take(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::NameTable;
    use crate::scope::Qualification;
    use idlmux_spec::registry::Registry;
    use idlmux_spec::types::common::Target;
    use idlmux_spec::types::definitions::{Schema, TypeDef};

    #[test]
    fn test_structural_signature() {
        let nested = FieldType::map(
            "string",
            FieldType::map("string", FieldType::map("string", FieldType::named("bool"))),
        );
        assert_eq!(
            structural_signature(&nested),
            "map<string,map<string,map<string,bool>>>"
        );
        let arr = FieldType::map("int32", FieldType::array(FieldType::named("User")));
        assert_eq!(structural_signature(&arr), "map<int32,[User]>");
    }

    #[test]
    fn test_classify_value() {
        let mut schema = Schema::new("ns");
        schema.types.push(TypeDef::new("User", "ns"));
        let (registry, _) = Registry::build(&schema);
        let names = NameTable::build(&schema, Target::OpenApi);
        let scope = RenderScope::new(&registry, &names, Qualification::Flat).within("ns");

        let scalar = FieldType::named("int64");
        assert_eq!(classify_value(&scalar, &scope), MapValue::Scalar("int64"));

        let user = FieldType::named("User");
        assert!(matches!(classify_value(&user, &scope), MapValue::Declared(e) if e.name == "User"));

        let ghost = FieldType::named("Ghost");
        assert_eq!(classify_value(&ghost, &scope), MapValue::Unknown("Ghost"));

        let inner = FieldType::map("string", FieldType::named("bool"));
        assert!(matches!(classify_value(&inner, &scope), MapValue::Map { key: "string", .. }));
    }

    #[test]
    fn test_warnings_collect() {
        let mut warnings = MapWarnings::default();
        assert!(warnings.is_empty());
        warnings.unknown_value("Ghost", "ns");
        let taken = warnings.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].code, E_UNKNOWN_VALUE_TYPE);
        assert!(warnings.is_empty());
    }
}
