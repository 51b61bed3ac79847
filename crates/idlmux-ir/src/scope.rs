use idlmux_spec::registry::{Registry, ResolveError, SymbolEntry};

use crate::names::NameTable;
use crate::namespace::effective_namespace;

/// How references to declarations in other namespaces are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualification {
    /// One symbol space: every reference prints the bare emitted name
    Flat,
    /// One file per namespace: foreign references print `<namespace>.<name>`
    ByNamespace,
}

/// Read-only view a renderer needs to turn a reference into target text.
#[derive(Debug, Clone, Copy)]
pub struct RenderScope<'a> {
    pub registry: &'a Registry,
    pub names: &'a NameTable,
    /// Namespace of the declaration being rendered
    pub namespace: &'a str,
    pub qualification: Qualification,
}

impl<'a> RenderScope<'a> {
    pub fn new(registry: &'a Registry, names: &'a NameTable, qualification: Qualification) -> Self {
        Self {
            registry,
            names,
            namespace: "",
            qualification,
        }
    }

    /// The same scope, rendering a declaration from `namespace`.
    pub fn within(&self, namespace: &'a str) -> Self {
        Self { namespace, ..*self }
    }

    pub fn resolve(&self, name: &str) -> Result<&'a SymbolEntry, ResolveError> {
        self.registry.resolve(name, self.namespace)
    }

    /// Print a resolved symbol as seen from the current namespace.
    pub fn print(&self, entry: &SymbolEntry) -> String {
        let name = self.names.emitted_name(entry);
        match self.qualification {
            Qualification::Flat => name,
            Qualification::ByNamespace => {
                let theirs = effective_namespace(&entry.namespace);
                if theirs == effective_namespace(self.namespace) {
                    name
                } else {
                    format!("{theirs}.{name}")
                }
            }
        }
    }

    /// Resolve and print a declared-type reference.
    pub fn reference(&self, name: &str) -> Result<String, ResolveError> {
        self.resolve(name).map(|entry| self.print(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlmux_spec::types::common::Target;
    use idlmux_spec::types::definitions::{Schema, TypeDef};

    fn fixture() -> (Registry, NameTable) {
        let mut schema = Schema::new("com.shop");
        let mut item = TypeDef::new("Item", "com.shop");
        item.annotations.proto.name = Some("ShopItem".to_string());
        schema.types.push(item);
        schema.types.push(TypeDef::new("Address", "com.geo"));
        schema.types.push(TypeDef::new("Loose", ""));
        let names = NameTable::build(&schema, Target::Protobuf);
        (Registry::build(&schema).0, names)
    }

    #[test]
    fn test_by_namespace_printing() {
        let (registry, names) = fixture();
        let scope = RenderScope::new(&registry, &names, Qualification::ByNamespace).within("com.shop");

        assert_eq!(scope.reference("Item").unwrap(), "ShopItem");
        assert_eq!(scope.reference("Address").unwrap(), "com.geo.Address");
        assert_eq!(scope.reference("com.geo.Address").unwrap(), "com.geo.Address");
        assert_eq!(scope.reference("Loose").unwrap(), "api.Loose");

        let geo = scope.within("com.geo");
        assert_eq!(geo.reference("com.shop.Item").unwrap(), "com.shop.ShopItem");
    }

    #[test]
    fn test_flat_printing() {
        let (registry, names) = fixture();
        let scope = RenderScope::new(&registry, &names, Qualification::Flat).within("com.shop");
        assert_eq!(scope.reference("com.geo.Address").unwrap(), "Address");
        assert!(scope.reference("Nowhere").is_err());
    }
}
