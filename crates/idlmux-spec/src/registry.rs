use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::types::definitions::Schema;
use crate::types::error::{ErrorEntry, E_DUPLICATE_SYMBOL};

/// Separator between namespace and name in a qualified key.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Declaration kinds that can be referenced from a field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Type,
    Enum,
    Union,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Type => write!(f, "type"),
            SymbolKind::Enum => write!(f, "enum"),
            SymbolKind::Union => write!(f, "union"),
        }
    }
}

/// Entry in the symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// `<namespace>.<name>`; a leading separator for the empty namespace
    pub qualified: String,
    pub namespace: String,
    pub name: String,
    pub kind: SymbolKind,
    /// JSONPath of the declaration within the model
    pub path: String,
}

/// Why a reference could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("qualified name '{name}' is not declared")]
    UnresolvedQualifiedName { name: String },

    #[error("unknown symbol '{name}' (referenced from namespace '{namespace}')")]
    UnknownSymbol { name: String, namespace: String },

    #[error("ambiguous symbol '{name}': candidates are {}", .candidates.join(", "))]
    AmbiguousSymbol {
        name: String,
        candidates: Vec<String>,
    },
}

/// Two or more declarations sharing one emitted name across namespaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatConflict {
    pub name: String,
    /// Sorted, deduplicated
    pub namespaces: Vec<String>,
}

/// Namespace-qualified symbol table, derived once from a [`Schema`].
///
/// Types, enums and unions live in separate maps keyed by their qualified
/// name. The registry is never mutated after [`Registry::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: IndexMap<String, SymbolEntry>,
    enums: IndexMap<String, SymbolEntry>,
    unions: IndexMap<String, SymbolEntry>,
    /// Later declarations whose qualified name was already taken
    shadowed: Vec<SymbolEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every type, enum and union of `schema`.
    /// Returns the registry plus one entry per exact duplicate.
    pub fn build(schema: &Schema) -> (Self, Vec<ErrorEntry>) {
        let mut registry = Self::new();
        let mut errors = Vec::new();

        for (i, e) in schema.enums.iter().enumerate() {
            let path = format!("$.enums[{i}]");
            errors.extend(registry.register(&e.namespace, &e.name, SymbolKind::Enum, &path));
        }
        for (i, t) in schema.types.iter().enumerate() {
            let path = format!("$.types[{i}]");
            errors.extend(registry.register(&t.namespace, &t.name, SymbolKind::Type, &path));
        }
        for (i, u) in schema.unions.iter().enumerate() {
            let path = format!("$.unions[{i}]");
            errors.extend(registry.register(&u.namespace, &u.name, SymbolKind::Union, &path));
        }

        tracing::debug!(
            types = registry.types.len(),
            enums = registry.enums.len(),
            unions = registry.unions.len(),
            "registry built"
        );
        (registry, errors)
    }

    /// Register a symbol. Returns an error if the qualified name is already
    /// taken by a symbol of the same kind; the first registration wins.
    pub fn register(
        &mut self,
        namespace: &str,
        name: &str,
        kind: SymbolKind,
        path: &str,
    ) -> Option<ErrorEntry> {
        let qualified = qualify(namespace, name);
        let entry = SymbolEntry {
            qualified: qualified.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            path: path.to_string(),
        };
        if let Some(existing) = self.map(kind).get(&qualified) {
            let error = ErrorEntry::error(
                E_DUPLICATE_SYMBOL,
                format!(
                    "Duplicate {kind} '{qualified}' (also declared at {})",
                    existing.path
                ),
                "",
                path,
            )
            .with_suggestion(format!(
                "Rename one of the '{name}' declarations or move it to another namespace"
            ));
            self.shadowed.push(entry);
            return Some(error);
        }
        self.map_mut(kind).insert(qualified, entry);
        None
    }

    /// Resolve `name` as written inside `current_namespace`.
    ///
    /// 1. A name containing the separator is fully qualified and must exist.
    /// 2. Otherwise `<current_namespace>.<name>` is tried first.
    /// 3. Otherwise every qualified name ending in `.<name>` is a candidate;
    ///    exactly one must exist.
    pub fn resolve(&self, name: &str, current_namespace: &str) -> Result<&SymbolEntry, ResolveError> {
        if name.contains(NAMESPACE_SEPARATOR) {
            return self
                .lookup(name)
                .ok_or_else(|| ResolveError::UnresolvedQualifiedName {
                    name: name.to_string(),
                });
        }

        if let Some(entry) = self.lookup(&qualify(current_namespace, name)) {
            return Ok(entry);
        }

        let mut candidates: Vec<&SymbolEntry> =
            self.entries().filter(|e| e.name == name).collect();
        match candidates.len() {
            0 => Err(ResolveError::UnknownSymbol {
                name: name.to_string(),
                namespace: current_namespace.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => {
                let mut names: Vec<String> =
                    candidates.iter().map(|e| e.qualified.clone()).collect();
                names.sort();
                names.dedup();
                Err(ResolveError::AmbiguousSymbol {
                    name: name.to_string(),
                    candidates: names,
                })
            }
        }
    }

    /// Look up an exact qualified name in any of the three maps.
    pub fn lookup(&self, qualified: &str) -> Option<&SymbolEntry> {
        self.types
            .get(qualified)
            .or_else(|| self.enums.get(qualified))
            .or_else(|| self.unions.get(qualified))
    }

    pub fn lookup_kind(&self, qualified: &str, kind: SymbolKind) -> Option<&SymbolEntry> {
        self.map(kind).get(qualified)
    }

    /// All symbols: enums, then types, then unions, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.enums
            .values()
            .chain(self.types.values())
            .chain(self.unions.values())
    }

    /// Declarations dropped by [`Registry::register`] because their
    /// qualified name was taken by an earlier one of the same kind.
    pub fn shadowed(&self) -> &[SymbolEntry] {
        &self.shadowed
    }

    /// Every declaration, shadowed ones included.
    fn declarations(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries().chain(self.shadowed.iter())
    }

    pub fn symbols_of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &SymbolEntry> {
        self.map(kind).values()
    }

    /// Symbols that collide once namespaces are flattened away.
    ///
    /// `emitted_name` gives the name a symbol is printed under in the flat
    /// target, so per-target renames are taken into account. Exact
    /// duplicates always conflict.
    pub fn flat_conflicts<F>(&self, emitted_name: F) -> Vec<FlatConflict>
    where
        F: Fn(&SymbolEntry) -> String,
    {
        let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in self.declarations() {
            by_name
                .entry(emitted_name(entry))
                .or_default()
                .push(entry.namespace.clone());
        }
        by_name
            .into_iter()
            .filter(|(_, namespaces)| namespaces.len() > 1)
            .map(|(name, mut namespaces)| {
                namespaces.sort();
                namespaces.dedup();
                FlatConflict { name, namespaces }
            })
            .collect()
    }

    /// Symbols that collide inside their own namespace, for targets that
    /// keep namespaces apart.
    pub fn namespace_conflicts<F>(&self, emitted_name: F) -> Vec<FlatConflict>
    where
        F: Fn(&SymbolEntry) -> String,
    {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for entry in self.declarations() {
            *counts
                .entry((emitted_name(entry), entry.namespace.clone()))
                .or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((name, namespace), _)| FlatConflict {
                name,
                namespaces: vec![namespace],
            })
            .collect()
    }

    /// Total number of registered symbols
    pub fn len(&self) -> usize {
        self.types.len() + self.enums.len() + self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self, kind: SymbolKind) -> &IndexMap<String, SymbolEntry> {
        match kind {
            SymbolKind::Type => &self.types,
            SymbolKind::Enum => &self.enums,
            SymbolKind::Union => &self.unions,
        }
    }

    fn map_mut(&mut self, kind: SymbolKind) -> &mut IndexMap<String, SymbolEntry> {
        match kind {
            SymbolKind::Type => &mut self.types,
            SymbolKind::Enum => &mut self.enums,
            SymbolKind::Union => &mut self.unions,
        }
    }
}

/// `<namespace>.<name>`
pub fn qualify(namespace: &str, name: &str) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
}

/// Split a qualified name into `(namespace, name)`. Unqualified names have
/// an empty namespace.
pub fn split_qualified(qualified: &str) -> (&str, &str) {
    qualified
        .rsplit_once(NAMESPACE_SEPARATOR)
        .unwrap_or(("", qualified))
}
