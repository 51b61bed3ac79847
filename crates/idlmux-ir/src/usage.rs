use std::collections::HashSet;

use idlmux_spec::registry::{qualify, Registry};
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;

use crate::graph::TypeGraph;

/// Direction(s) a declaration travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Input,
    Output,
    Both,
}

/// Usage classification for every reachable type and union.
#[derive(Debug, Clone, Default)]
pub struct UsageMap {
    input: HashSet<String>,
    output: HashSet<String>,
    union_options: HashSet<String>,
}

impl UsageMap {
    /// Classify against the fields `target` includes.
    ///
    /// Method inputs seed the input set and outputs seed the output set;
    /// both are closed over [`TypeGraph`]. Union options count as both.
    pub fn classify(schema: &Schema, registry: &Registry, target: Target) -> Self {
        let graph = TypeGraph::build(schema, registry, target);

        let mut input_seeds = Vec::new();
        let mut output_seeds = Vec::new();
        for s in &schema.services {
            for m in &s.methods {
                if let Ok(entry) = registry.resolve(&m.input, &s.namespace) {
                    input_seeds.push(entry.qualified.clone());
                }
                if let Ok(entry) = registry.resolve(&m.output, &s.namespace) {
                    output_seeds.push(entry.qualified.clone());
                }
            }
        }

        let union_options = schema
            .unions
            .iter()
            .flat_map(|u| {
                u.options
                    .iter()
                    .filter_map(|o| registry.resolve(o, &u.namespace).ok())
                    .map(|e| e.qualified.clone())
            })
            .collect();

        let map = Self {
            input: graph.reachable_from(input_seeds.iter().map(String::as_str)),
            output: graph.reachable_from(output_seeds.iter().map(String::as_str)),
            union_options,
        };
        tracing::debug!(
            %target,
            input = map.input.len(),
            output = map.output.len(),
            "classified type usage"
        );
        map
    }

    pub fn usage(&self, qualified: &str) -> Option<Usage> {
        if self.union_options.contains(qualified) {
            return Some(Usage::Both);
        }
        match (self.input.contains(qualified), self.output.contains(qualified)) {
            (true, true) => Some(Usage::Both),
            (true, false) => Some(Usage::Input),
            (false, true) => Some(Usage::Output),
            (false, false) => None,
        }
    }

    /// Whether an input-suffixed declaration is emitted next to the canonical one.
    pub fn needs_input_variant(&self, namespace: &str, name: &str) -> bool {
        matches!(
            self.usage(&qualify(namespace, name)),
            Some(Usage::Input | Usage::Both)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlmux_spec::types::definitions::{
        Field, FieldType, Method, ServiceDef, TypeDef, UnionDef,
    };

    fn chat_schema() -> Schema {
        let mut schema = Schema::new("chat");
        schema.types.push(
            TypeDef::new("SendRequest", "chat")
                .with_field(Field::new("body", FieldType::named("Body")))
                .with_field(Field::new(
                    "meta",
                    FieldType::map("string", FieldType::named("Meta")),
                )),
        );
        schema.types.push(
            TypeDef::new("SendResponse", "chat")
                .with_field(Field::new("receipt", FieldType::named("Receipt")))
                .with_field(Field::new("echo", FieldType::array(FieldType::named("Body")))),
        );
        schema.types.push(
            TypeDef::new("Body", "chat")
                .with_field(Field::new("parent", FieldType::named("Body"))),
        );
        schema.types.push(TypeDef::new("Meta", "chat"));
        schema.types.push(TypeDef::new("Receipt", "chat"));
        schema.types.push(TypeDef::new("Orphan", "chat"));
        schema.types.push(TypeDef::new("Choice", "chat"));
        schema.unions.push(UnionDef {
            name: "Pick".to_string(),
            namespace: "chat".to_string(),
            options: vec!["Choice".to_string()],
            ..UnionDef::default()
        });
        schema.services.push(ServiceDef {
            name: "Chat".to_string(),
            namespace: "chat".to_string(),
            methods: vec![Method::new("Send", "SendRequest", "SendResponse")],
            doc: None,
        });
        schema
    }

    #[test]
    fn test_classification() {
        let schema = chat_schema();
        let (registry, _) = Registry::build(&schema);
        let usage = UsageMap::classify(&schema, &registry, Target::Graphql);

        assert_eq!(usage.usage("chat.SendRequest"), Some(Usage::Input));
        assert_eq!(usage.usage("chat.Meta"), Some(Usage::Input));
        assert_eq!(usage.usage("chat.SendResponse"), Some(Usage::Output));
        assert_eq!(usage.usage("chat.Receipt"), Some(Usage::Output));
        // Reached from both sides, through a self-cycle.
        assert_eq!(usage.usage("chat.Body"), Some(Usage::Both));
        assert_eq!(usage.usage("chat.Orphan"), None);
        assert_eq!(usage.usage("chat.Choice"), Some(Usage::Both));
    }

    #[test]
    fn test_needs_input_variant() {
        let schema = chat_schema();
        let (registry, _) = Registry::build(&schema);
        let usage = UsageMap::classify(&schema, &registry, Target::Graphql);

        assert!(usage.needs_input_variant("chat", "SendRequest"));
        assert!(usage.needs_input_variant("chat", "Body"));
        assert!(!usage.needs_input_variant("chat", "Receipt"));
        assert!(!usage.needs_input_variant("chat", "Orphan"));
    }
}
