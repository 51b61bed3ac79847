use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::annotations::{DeprecationInfo, Documentation, FormatAnnotations, ValidationRules};
use super::common::{HttpMethod, OperationKind, Target};

/// A complete model: every declaration that takes part in one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Primary namespace (package) of the model
    #[serde(default)]
    pub namespace: String,

    /// Model version, used as the OpenAPI info version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// File-level annotations: proto options, GraphQL schema directives,
    /// OpenAPI `title:` / `version:` / `description:` overrides
    #[serde(default)]
    pub namespace_annotations: FormatAnnotations,

    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub unions: Vec<UnionDef>,
    #[serde(default)]
    pub services: Vec<ServiceDef>,
}

impl Schema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Give declarations without a namespace the document's namespace.
    pub fn inherit_namespace(&mut self) {
        if self.namespace.is_empty() {
            return;
        }
        let ns = self.namespace.clone();
        let fill = |target: &mut String| {
            if target.is_empty() {
                *target = ns.clone();
            }
        };
        self.enums.iter_mut().for_each(|e| fill(&mut e.namespace));
        self.types.iter_mut().for_each(|t| fill(&mut t.namespace));
        self.unions.iter_mut().for_each(|u| fill(&mut u.namespace));
        self.services.iter_mut().for_each(|s| fill(&mut s.namespace));
    }

    /// Total number of declarations.
    pub fn declaration_count(&self) -> usize {
        self.enums.len() + self.types.len() + self.unions.len() + self.services.len()
    }
}

/// An object type with ordered fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
    #[serde(default)]
    pub annotations: FormatAnnotations,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields that take part in `target`, in declaration order.
    pub fn included_fields(&self, target: Target) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.includes(target))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Default literal, kept as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Targets this field is left out of
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from: Vec<Target>,

    /// When non-empty, the only targets this field appears in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_for: Vec<Target>,

    /// Explicit wire number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,

    #[serde(default)]
    pub annotations: FormatAnnotations,

    /// Version the field was introduced in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            exclude_from: Vec::new(),
            only_for: Vec::new(),
            number: None,
            deprecated: None,
            validation: None,
            doc: None,
            annotations: FormatAnnotations::default(),
            since: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn numbered(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn excluded_from(mut self, target: Target) -> Self {
        self.exclude_from.push(target);
        self
    }

    /// Whether this field takes part in `target`.
    pub fn includes(&self, target: Target) -> bool {
        if !self.only_for.is_empty() {
            return self.only_for.contains(&target);
        }
        !self.exclude_from.contains(&target)
    }

    /// Non-null in targets that distinguish nullability.
    pub fn is_non_null(&self) -> bool {
        self.required && !self.field_type.optional
    }
}

/// The shape of a field's value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FieldType {
    #[serde(flatten)]
    pub shape: TypeShape,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeShape {
    /// A builtin scalar or a declared Type/Enum/Union (qualified or not)
    Named { name: String },
    Array { items: Box<FieldType> },
    /// Keys are always scalars; values may be maps themselves
    Map { key: String, value: Box<FieldType> },
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::Named { name: name.into() },
            optional: false,
        }
    }

    pub fn array(items: FieldType) -> Self {
        Self {
            shape: TypeShape::Array {
                items: Box::new(items),
            },
            optional: false,
        }
    }

    pub fn map(key: impl Into<String>, value: FieldType) -> Self {
        Self {
            shape: TypeShape::Map {
                key: key.into(),
                value: Box::new(value),
            },
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The name of a named shape.
    pub fn name(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Named { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.shape, TypeShape::Map { .. })
    }

    /// Every name this type mentions, through array items and map values.
    /// Map keys are scalars and are not reported.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.shape {
            TypeShape::Named { name } => out.push(name),
            TypeShape::Array { items } => items.collect_names(out),
            TypeShape::Map { value, .. } => value.collect_names(out),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
    #[serde(default)]
    pub annotations: FormatAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
            doc: None,
        }
    }
}

/// A closed set of alternative object types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UnionDef {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Option type names, order preserved
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
    #[serde(default)]
    pub annotations: FormatAnnotations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceDef {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub client_streaming: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub server_streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKind>,
    /// Path template such as `/users/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_codes: Vec<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_codes: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Documentation>,
}

impl Method {
    pub fn new(name: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    fn is_read(&self) -> bool {
        self.name.starts_with("Get") || self.name.starts_with("List")
    }

    /// Declared HTTP method, else GET for `Get*`/`List*` names, else POST.
    pub fn http_method(&self) -> HttpMethod {
        self.http_method.unwrap_or(if self.is_read() {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        })
    }

    /// Declared operation kind, else subscription for server streams,
    /// query for `Get*`/`List*` names, mutation otherwise.
    pub fn operation_kind(&self) -> OperationKind {
        if let Some(kind) = self.operation {
            return kind;
        }
        if self.server_streaming {
            OperationKind::Subscription
        } else if self.is_read() {
            OperationKind::Query
        } else {
            OperationKind::Mutation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_type_json_shape() {
        let json = serde_json::json!({
            "kind": "map",
            "key": "string",
            "value": { "kind": "array", "items": { "kind": "named", "name": "User" } },
            "optional": true
        });
        let ft: FieldType = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            ft,
            FieldType::map("string", FieldType::array(FieldType::named("User"))).optional()
        );
        assert_eq!(serde_json::to_value(&ft).unwrap(), json);
    }

    #[test]
    fn test_referenced_names_walks_arrays_and_map_values() {
        let ft = FieldType::map(
            "string",
            FieldType::map("int32", FieldType::array(FieldType::named("other.Item"))),
        );
        assert_eq!(ft.referenced_names(), vec!["other.Item"]);
    }

    #[test]
    fn test_field_includes() {
        let base = Field::new("a", FieldType::named("string"));
        assert!(base.includes(Target::Graphql));

        let excluded = base.clone().excluded_from(Target::Protobuf);
        assert!(!excluded.includes(Target::Protobuf));
        assert!(excluded.includes(Target::OpenApi));

        let mut only = base;
        only.only_for = vec![Target::OpenApi];
        only.exclude_from = vec![Target::OpenApi];
        assert!(only.includes(Target::OpenApi));
        assert!(!only.includes(Target::Graphql));
    }

    #[test]
    fn test_method_heuristics() {
        let get = Method::new("GetUser", "GetUserRequest", "User");
        assert_eq!(get.http_method(), HttpMethod::Get);
        assert_eq!(get.operation_kind(), OperationKind::Query);

        let create = Method::new("CreateUser", "CreateUserRequest", "User");
        assert_eq!(create.http_method(), HttpMethod::Post);
        assert_eq!(create.operation_kind(), OperationKind::Mutation);

        let mut watch = Method::new("GetUpdates", "WatchRequest", "Update");
        watch.server_streaming = true;
        assert_eq!(watch.operation_kind(), OperationKind::Subscription);

        let mut explicit = Method::new("ListUsers", "Req", "Resp");
        explicit.http_method = Some(HttpMethod::Put);
        explicit.operation = Some(OperationKind::Mutation);
        assert_eq!(explicit.http_method(), HttpMethod::Put);
        assert_eq!(explicit.operation_kind(), OperationKind::Mutation);
    }

    #[test]
    fn test_inherit_namespace_keeps_explicit() {
        let mut schema = Schema::new("app");
        schema.types.push(TypeDef::new("A", ""));
        schema.types.push(TypeDef::new("B", "other"));
        schema.inherit_namespace();
        assert_eq!(schema.types[0].namespace, "app");
        assert_eq!(schema.types[1].namespace, "other");
    }

    #[test]
    fn test_schema_defaults_from_minimal_json() {
        let schema: Schema = serde_json::from_value(serde_json::json!({
            "namespace": "com.example",
            "types": [{ "name": "User", "fields": [
                { "name": "id", "type": { "kind": "named", "name": "string" }, "required": true }
            ]}]
        }))
        .unwrap();
        assert_eq!(schema.namespace, "com.example");
        assert_eq!(schema.types[0].fields[0].name, "id");
        assert!(schema.types[0].fields[0].is_non_null());
        assert!(schema.enums.is_empty());
        assert_eq!(schema.declaration_count(), 1);
    }
}
