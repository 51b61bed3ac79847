use std::collections::{BTreeMap, BTreeSet};

use idlmux_spec::registry::{split_qualified, Registry, NAMESPACE_SEPARATOR};
use idlmux_spec::types::common::{is_builtin_scalar, Target};
use idlmux_spec::types::definitions::Schema;

/// Bucket for declarations without a namespace.
pub const DEFAULT_NAMESPACE: &str = "api";

pub fn effective_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}

/// Group declarations by namespace, one sub-model per output file.
///
/// Namespace annotations travel only with the model's own namespace.
pub fn partition(schema: &Schema) -> BTreeMap<String, Schema> {
    let main = effective_namespace(&schema.namespace).to_string();
    let mut parts: BTreeMap<String, Schema> = BTreeMap::new();

    for e in &schema.enums {
        bucket(&mut parts, schema, &main, &e.namespace).enums.push(e.clone());
    }
    for t in &schema.types {
        bucket(&mut parts, schema, &main, &t.namespace).types.push(t.clone());
    }
    for u in &schema.unions {
        bucket(&mut parts, schema, &main, &u.namespace).unions.push(u.clone());
    }
    for s in &schema.services {
        bucket(&mut parts, schema, &main, &s.namespace).services.push(s.clone());
    }

    tracing::debug!(files = parts.len(), "partitioned model by namespace");
    parts
}

fn bucket<'p>(
    parts: &'p mut BTreeMap<String, Schema>,
    schema: &Schema,
    main: &str,
    namespace: &str,
) -> &'p mut Schema {
    let key = effective_namespace(namespace);
    parts.entry(key.to_string()).or_insert_with(|| {
        let mut part = Schema::new(key);
        part.version = schema.version.clone();
        if key == main {
            part.namespace_annotations = schema.namespace_annotations.clone();
        }
        part
    })
}

/// Namespaces a partition's file must import, sorted.
///
/// Every field type (through arrays and map values), union option, and
/// method payload is checked. A resolvable name contributes the namespace it
/// resolves to; an unresolvable qualified name contributes its written
/// namespace prefix, so a namespace nobody declares still shows up here.
pub fn required_imports(part: &Schema, registry: &Registry, target: Target) -> Vec<String> {
    let current = effective_namespace(&part.namespace);
    let mut references: Vec<(&str, &str)> = Vec::new();

    for t in &part.types {
        for field in t.included_fields(target) {
            for name in field.field_type.referenced_names() {
                references.push((name, t.namespace.as_str()));
            }
        }
    }
    for u in &part.unions {
        for option in &u.options {
            references.push((option.as_str(), u.namespace.as_str()));
        }
    }
    for s in &part.services {
        for m in &s.methods {
            references.push((m.input.as_str(), s.namespace.as_str()));
            references.push((m.output.as_str(), s.namespace.as_str()));
        }
    }

    let mut imports = BTreeSet::new();
    for (name, from) in references {
        if is_builtin_scalar(name) {
            continue;
        }
        let namespace = match registry.resolve(name, from) {
            Ok(entry) => effective_namespace(&entry.namespace).to_string(),
            Err(_) if name.contains(NAMESPACE_SEPARATOR) => {
                effective_namespace(split_qualified(name).0).to_string()
            }
            Err(_) => continue,
        };
        if namespace != current {
            imports.insert(namespace);
        }
    }
    imports.into_iter().collect()
}

/// `com.example.users` + `proto` -> `com/example/users.proto`
pub fn import_path(namespace: &str, extension: &str) -> String {
    format!(
        "{}.{extension}",
        effective_namespace(namespace).replace(NAMESPACE_SEPARATOR, "/")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlmux_spec::types::definitions::{Field, FieldType, Method, ServiceDef, TypeDef};
    use pretty_assertions::assert_eq;

    fn multi_namespace_schema() -> Schema {
        let mut schema = Schema::new("com.example.orders");
        schema.namespace_annotations.proto.options = vec!["go_package = \"x\"".to_string()];
        schema.types.push(TypeDef::new("User", "com.example.users"));
        schema.types.push(
            TypeDef::new("Order", "com.example.orders")
                .with_field(Field::new("owner", FieldType::named("com.example.users.User")))
                .with_field(Field::new(
                    "history",
                    FieldType::map("string", FieldType::array(FieldType::named("Audit"))),
                ))
                .with_field(
                    Field::new("ghost", FieldType::named("com.example.ghost.Phantom"))
                        .excluded_from(Target::Graphql),
                ),
        );
        schema.types.push(TypeDef::new("Audit", ""));
        schema.services.push(ServiceDef {
            name: "OrderService".to_string(),
            namespace: "com.example.orders".to_string(),
            methods: vec![Method::new("GetOrder", "Order", "com.example.users.User")],
            doc: None,
        });
        schema
    }

    #[test]
    fn test_partition_buckets() {
        let parts = partition(&multi_namespace_schema());
        let keys: Vec<&str> = parts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["api", "com.example.orders", "com.example.users"]);
        assert_eq!(parts["api"].types[0].name, "Audit");
        assert_eq!(parts["com.example.orders"].services.len(), 1);
    }

    #[test]
    fn test_partition_annotations_only_in_main() {
        let parts = partition(&multi_namespace_schema());
        assert_eq!(parts["com.example.orders"].namespace_annotations.proto.options.len(), 1);
        assert!(parts["com.example.users"].namespace_annotations.proto.options.is_empty());
    }

    #[test]
    fn test_required_imports_sorted_and_deduped() {
        let schema = multi_namespace_schema();
        let (registry, _) = Registry::build(&schema);
        let parts = partition(&schema);

        let imports = required_imports(&parts["com.example.orders"], &registry, Target::Protobuf);
        assert_eq!(
            imports,
            vec!["api", "com.example.ghost", "com.example.users"]
        );

        // Excluded field does not pull its namespace in.
        let imports = required_imports(&parts["com.example.orders"], &registry, Target::Graphql);
        assert_eq!(imports, vec!["api", "com.example.users"]);

        assert!(required_imports(&parts["com.example.users"], &registry, Target::Protobuf).is_empty());
    }

    #[test]
    fn test_import_path() {
        assert_eq!(import_path("com.example.users", "proto"), "com/example/users.proto");
        assert_eq!(import_path("", "proto"), "api.proto");
    }
}
