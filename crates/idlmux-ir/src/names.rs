use std::collections::HashMap;

use idlmux_spec::registry::{qualify, FlatConflict, Registry, SymbolEntry};
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;

/// Per-target name overrides keyed by qualified name.
///
/// Overrides apply to types, enums and unions. Every reference site and the
/// declaration itself print the overridden name.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    target: Option<Target>,
    overrides: HashMap<String, String>,
}

impl NameTable {
    pub fn build(schema: &Schema, target: Target) -> Self {
        let mut overrides = HashMap::new();
        let declared = schema
            .enums
            .iter()
            .map(|e| (&e.namespace, &e.name, &e.annotations))
            .chain(schema.types.iter().map(|t| (&t.namespace, &t.name, &t.annotations)))
            .chain(schema.unions.iter().map(|u| (&u.namespace, &u.name, &u.annotations)));

        for (namespace, name, annotations) in declared {
            if let Some(renamed) = annotations.name_for(target) {
                overrides.insert(qualify(namespace, name), renamed.to_string());
            }
        }

        Self {
            target: Some(target),
            overrides,
        }
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    /// Name a registered symbol is emitted under.
    pub fn emitted_name(&self, entry: &SymbolEntry) -> String {
        self.emitted(&entry.qualified, &entry.name)
    }

    /// Name a declaration is emitted under, from its namespace and name.
    pub fn declared_name(&self, namespace: &str, name: &str) -> String {
        self.emitted(&qualify(namespace, name), name)
    }

    fn emitted(&self, qualified: &str, name: &str) -> String {
        self.overrides
            .get(qualified)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Emitted-name collisions once namespaces are flattened away.
    pub fn flat_conflicts(&self, registry: &Registry) -> Vec<FlatConflict> {
        registry.flat_conflicts(|entry| self.emitted_name(entry))
    }

    /// Emitted-name collisions inside a single namespace.
    pub fn namespace_conflicts(&self, registry: &Registry) -> Vec<FlatConflict> {
        registry.namespace_conflicts(|entry| self.emitted_name(entry))
    }
}
