use std::collections::{HashMap, HashSet};

use idlmux_spec::registry::{qualify, Registry, SymbolKind};
use idlmux_spec::types::common::{is_builtin_scalar, Target};
use idlmux_spec::types::definitions::Schema;

/// Reference graph between object declarations, keyed by qualified name.
///
/// Edge semantics: if `A -> B` exists, a payload containing A also contains
/// B. Types point at the types and unions their included fields mention
/// (through array items and map values); unions point at their options.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    edges: HashMap<String, HashSet<String>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for the fields `target` includes. Unresolvable
    /// references and enum references add no edge.
    pub fn build(schema: &Schema, registry: &Registry, target: Target) -> Self {
        let mut graph = Self::new();

        for t in &schema.types {
            let from = qualify(&t.namespace, &t.name);
            for field in t.included_fields(target) {
                for name in field.field_type.referenced_names() {
                    if is_builtin_scalar(name) {
                        continue;
                    }
                    if let Ok(entry) = registry.resolve(name, &t.namespace) {
                        if entry.kind != SymbolKind::Enum {
                            graph.add_edge(from.clone(), entry.qualified.clone());
                        }
                    }
                }
            }
        }

        for u in &schema.unions {
            let from = qualify(&u.namespace, &u.name);
            for option in &u.options {
                if let Ok(entry) = registry.resolve(option, &u.namespace) {
                    graph.add_edge(from.clone(), entry.qualified.clone());
                }
            }
        }

        graph
    }

    /// Add an edge: `from` contains `to`.
    pub fn add_edge(&mut self, from: String, to: String) {
        self.edges.entry(from).or_default().insert(to);
    }

    /// Direct references of a node.
    pub fn dependents(&self, node: &str) -> Option<&HashSet<String>> {
        self.edges.get(node)
    }

    /// Every node reachable from `seeds`, seeds included. Cycles terminate
    /// through the visited set.
    pub fn reachable_from<'s, I>(&self, seeds: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut visited = HashSet::new();
        let mut queue: Vec<&str> = seeds.into_iter().collect();

        while let Some(node) = queue.pop() {
            if !visited.insert(node.to_string()) {
                continue;
            }
            if let Some(deps) = self.edges.get(node) {
                for dep in deps {
                    if !visited.contains(dep) {
                        queue.push(dep);
                    }
                }
            }
        }

        visited
    }

    /// Return the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|s| s.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlmux_spec::types::definitions::{Field, FieldType, TypeDef, UnionDef};

    #[test]
    fn test_empty_graph() {
        let graph = TypeGraph::new();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.reachable_from(["a"]).contains("a"));
    }

    #[test]
    fn test_transitive_reachability() {
        let mut graph = TypeGraph::new();
        graph.add_edge("a".into(), "b".into());
        graph.add_edge("b".into(), "c".into());
        graph.add_edge("x".into(), "y".into());

        let reached = graph.reachable_from(["a"]);
        assert_eq!(reached.len(), 3);
        assert!(reached.contains("c"));
        assert!(!reached.contains("y"));
    }

    #[test]
    fn test_no_infinite_loop_on_cycle() {
        let mut graph = TypeGraph::new();
        graph.add_edge("a".into(), "b".into());
        graph.add_edge("b".into(), "a".into());

        let reached = graph.reachable_from(["a"]);
        assert_eq!(reached.len(), 2);
    }

    #[test]
    fn test_build_from_schema() {
        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("Node", "ns")
                .with_field(Field::new("children", FieldType::array(FieldType::named("Node"))))
                .with_field(Field::new(
                    "attrs",
                    FieldType::map("string", FieldType::named("Attr")),
                ))
                .with_field(
                    Field::new("hidden", FieldType::named("Secret")).excluded_from(Target::Graphql),
                ),
        );
        schema.types.push(TypeDef::new("Attr", "ns"));
        schema.types.push(TypeDef::new("Secret", "ns"));
        schema.unions.push(UnionDef {
            name: "Any".to_string(),
            namespace: "ns".to_string(),
            options: vec!["Attr".to_string(), "Node".to_string()],
            ..UnionDef::default()
        });
        let (registry, _) = Registry::build(&schema);

        let graph = TypeGraph::build(&schema, &registry, Target::Graphql);
        let node = graph.dependents("ns.Node").unwrap();
        assert!(node.contains("ns.Node"));
        assert!(node.contains("ns.Attr"));
        assert!(!node.contains("ns.Secret"));
        assert_eq!(graph.dependents("ns.Any").unwrap().len(), 2);

        let proto = TypeGraph::build(&schema, &registry, Target::Protobuf);
        assert!(proto.dependents("ns.Node").unwrap().contains("ns.Secret"));
    }
}
