use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};

use idlmux_ir::maps::{classify_value, structural_signature, MapValue, MapWarnings};
use idlmux_ir::{MapSynthesis, NameTable, Qualification, RenderScope, UnionRendering};
use idlmux_spec::registry::{Registry, ResolveError};
use idlmux_spec::types::annotations::{Documentation, ValidationRules};
use idlmux_spec::types::common::{is_builtin_scalar, HttpMethod, Target};
use idlmux_spec::types::definitions::{
    EnumDef, Field, FieldType, Method, Schema, ServiceDef, TypeDef, TypeShape, UnionDef,
};
use idlmux_spec::types::error::{ErrorEntry, E_DUPLICATE_OPERATION};

use crate::error::OpenApiError;
use crate::types::*;

const TARGET: Target = Target::OpenApi;
const JSON_MEDIA_TYPE: &str = "application/json";
const DISCRIMINATOR_PROPERTY: &str = "type";

/// Document-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Value of the top-level `openapi` field
    pub openapi_version: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            openapi_version: "3.0.0".to_string(),
        }
    }
}

/// An exported document plus the non-fatal diagnostics raised building it.
#[derive(Debug, Clone)]
pub struct OpenApiExport {
    pub document: OpenApiDocument,
    pub warnings: Vec<ErrorEntry>,
}

/// Discriminator-schema rendering: maps become recursive
/// `additionalProperties` objects, unions become `oneOf` plus a discriminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiExporter;

/// Export a model to an OpenAPI 3.0 document.
///
/// Emitted names share one symbol space, so two declarations with the same
/// emitted name abort the export. Unresolvable references abort as well;
/// only unknown map value types degrade to a placeholder.
pub fn export_openapi(
    schema: &Schema,
    registry: &Registry,
    options: &ExportOptions,
) -> Result<OpenApiExport, OpenApiError> {
    if !options.openapi_version.starts_with("3.") {
        return Err(OpenApiError::UnsupportedVersion(options.openapi_version.clone()));
    }

    let names = NameTable::build(schema, TARGET);
    if let Some(conflict) = names.flat_conflicts(registry).into_iter().next() {
        return Err(OpenApiError::DuplicateSymbol {
            name: conflict.name,
            namespaces: conflict.namespaces,
        });
    }

    let scope = RenderScope::new(registry, &names, Qualification::Flat);
    let exporter = OpenApiExporter;
    let mut warnings = MapWarnings::default();

    let info = build_info(schema);
    let mut path_warnings = Vec::new();
    let paths = build_paths(&schema.services, &scope, &mut path_warnings)?;
    let components = exporter.build_components(schema, &scope, &mut warnings)?;

    tracing::debug!(
        paths = paths.len(),
        schemas = components.schemas.len(),
        "exported openapi document"
    );

    Ok(OpenApiExport {
        document: OpenApiDocument {
            openapi: options.openapi_version.clone(),
            info,
            paths,
            components,
        },
        warnings: path_warnings.into_iter().chain(warnings.take()).collect(),
    })
}

pub fn to_yaml(document: &OpenApiDocument) -> Result<String, OpenApiError> {
    Ok(serde_yaml::to_string(document)?)
}

pub fn to_json(document: &OpenApiDocument) -> Result<String, OpenApiError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Title, version and description, overridable through namespace
/// annotations of the form `key: value`.
fn build_info(schema: &Schema) -> InfoObject {
    let mut info = InfoObject {
        title: if schema.namespace.is_empty() {
            "Generated API".to_string()
        } else {
            format!("{} API", schema.namespace)
        },
        version: schema
            .version
            .clone()
            .unwrap_or_else(|| "1.0.0".to_string()),
        description: None,
    };

    for option in schema.namespace_annotations.options_for(TARGET) {
        let Some((key, value)) = option.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "title" => info.title = value,
            "version" => info.version = value,
            "description" => info.description = Some(value),
            _ => {}
        }
    }
    info
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn json_content(schema: Value) -> IndexMap<String, MediaTypeObject> {
    let mut content = IndexMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaTypeObject { schema });
    content
}

fn build_paths(
    services: &[ServiceDef],
    scope: &RenderScope<'_>,
    warnings: &mut Vec<ErrorEntry>,
) -> Result<IndexMap<String, PathItemObject>, OpenApiError> {
    let mut paths: IndexMap<String, PathItemObject> = IndexMap::new();

    for (i, service) in services.iter().enumerate() {
        let scope = scope.within(&service.namespace);
        for (j, method) in service.methods.iter().enumerate() {
            let path = method.path.clone().unwrap_or_else(|| {
                format!(
                    "/{}/{}",
                    service.name.to_lowercase(),
                    method.name.to_lowercase()
                )
            });
            let operation = build_operation(method, &path, &scope)?;
            let http_method = method.http_method();
            let path_item = paths.entry(path.clone()).or_default();
            let slot = match http_method {
                HttpMethod::Get => &mut path_item.get,
                HttpMethod::Post => &mut path_item.post,
                HttpMethod::Put => &mut path_item.put,
                HttpMethod::Patch => &mut path_item.patch,
                HttpMethod::Delete => &mut path_item.delete,
            };
            if let Some(existing) = slot.as_ref() {
                tracing::warn!(%path, method = http_method.as_str(), "operation already defined");
                warnings.push(
                    ErrorEntry::warning(
                        E_DUPLICATE_OPERATION,
                        format!(
                            "{} {path} is already served by '{}'; '{}' is left out",
                            http_method.as_str().to_uppercase(),
                            existing.operation_id,
                            method.name
                        ),
                        "",
                        &format!("$.services[{i}].methods[{j}]"),
                    )
                    .with_suggestion("Give the method its own path or HTTP method"),
                );
            } else {
                *slot = Some(operation);
            }
        }
    }

    Ok(paths)
}

fn build_operation(
    method: &Method,
    path: &str,
    scope: &RenderScope<'_>,
) -> Result<OperationObject, OpenApiError> {
    let input = scope.reference(&method.input)?;
    let output = scope.reference(&method.output)?;

    let request_body = method.http_method().has_body().then(|| RequestBodyObject {
        required: true,
        content: json_content(schema_ref(&input)),
    });

    let mut responses = IndexMap::new();
    responses.insert(
        "200".to_string(),
        ResponseObject {
            description: "Successful response".to_string(),
            content: json_content(schema_ref(&output)),
        },
    );
    for code in &method.success_codes {
        responses.insert(
            code.to_string(),
            ResponseObject {
                description: success_description(*code),
                content: json_content(schema_ref(&output)),
            },
        );
    }
    for code in &method.error_codes {
        responses.insert(
            code.to_string(),
            ResponseObject {
                description: error_description(*code),
                content: json_content(json!({
                    "type": "object",
                    "properties": {
                        "error": { "type": "string", "description": "Error message" },
                        "code": { "type": "string", "description": "Error code" },
                    },
                })),
            },
        );
    }

    Ok(OperationObject {
        summary: format!("{} operation", method.name),
        operation_id: method.name.clone(),
        description: doc_text(method.doc.as_ref()),
        parameters: path_parameters(path)?,
        request_body,
        responses,
    })
}

/// One required string parameter per `{name}` segment of the path.
fn path_parameters(path: &str) -> Result<Vec<ParameterObject>, OpenApiError> {
    let re = Regex::new(r"\{([^{}/]+)\}")
        .map_err(|e| OpenApiError::InvalidPath(path.to_string(), e.to_string()))?;
    Ok(re
        .captures_iter(path)
        .map(|cap| ParameterObject {
            name: cap[1].to_string(),
            location: "path".to_string(),
            required: true,
            schema: json!({ "type": "string" }),
        })
        .collect())
}

fn success_description(code: u16) -> String {
    match code {
        200 => "OK - Successful response".to_string(),
        201 => "Created - Resource created successfully".to_string(),
        202 => "Accepted - Request accepted for processing".to_string(),
        204 => "No Content - Successful request with no response body".to_string(),
        206 => "Partial Content - Partial resource returned".to_string(),
        _ => format!("Success response ({code})"),
    }
}

fn error_description(code: u16) -> String {
    match code {
        400 => "Bad Request - Invalid input parameters".to_string(),
        401 => "Unauthorized - Authentication required".to_string(),
        403 => "Forbidden - Insufficient permissions".to_string(),
        404 => "Not Found - Resource not found".to_string(),
        409 => "Conflict - Resource already exists or conflict".to_string(),
        422 => "Unprocessable Entity - Validation error".to_string(),
        429 => "Too Many Requests - Rate limit exceeded".to_string(),
        500 => "Internal Server Error".to_string(),
        502 => "Bad Gateway".to_string(),
        503 => "Service Unavailable".to_string(),
        504 => "Gateway Timeout".to_string(),
        _ => format!("Error response ({code})"),
    }
}

fn doc_text(doc: Option<&Documentation>) -> Option<String> {
    doc.and_then(|d| d.for_target(TARGET)).map(str::to_string)
}

/// OpenAPI type and format of a builtin scalar.
fn scalar_schema(name: &str) -> (&'static str, Option<&'static str>) {
    match name {
        "int32" => ("integer", Some("int32")),
        "int64" => ("integer", Some("int64")),
        "uint8" | "uint16" => ("integer", Some("int32")),
        "uint32" | "uint64" => ("integer", Some("int64")),
        "float32" => ("number", Some("float")),
        "float64" => ("number", Some("double")),
        "bool" => ("boolean", None),
        "timestamp" => ("string", Some("date-time")),
        "bytes" => ("string", Some("byte")),
        _ => ("string", None),
    }
}

fn is_unsigned(name: &str) -> bool {
    matches!(name, "uint8" | "uint16" | "uint32" | "uint64")
}

fn scalar_value(name: &str) -> Value {
    let (ty, format) = scalar_schema(name);
    let mut schema = Map::new();
    schema.insert("type".into(), json!(ty));
    if let Some(format) = format {
        schema.insert("format".into(), json!(format));
    }
    Value::Object(schema)
}

/// Default literal typed by the field's scalar; unparsable literals stay strings.
fn typed_default(literal: &str, scalar: &str) -> Value {
    match scalar {
        "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64" => literal
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| json!(literal)),
        "float32" | "float64" => literal
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| json!(literal)),
        "bool" => json!(literal == "true"),
        _ => json!(literal),
    }
}

/// Merge `x-` extension objects written as JSON strings.
fn apply_extensions(schema: &mut Map<String, Value>, options: &[String]) {
    for option in options {
        match serde_json::from_str::<Map<String, Value>>(option) {
            Ok(extensions) => schema.extend(extensions),
            Err(err) => tracing::warn!(option = %option, %err, "ignoring malformed openapi extension"),
        }
    }
}

fn apply_validation(schema: &mut Map<String, Value>, rules: &ValidationRules) {
    let numbers = [
        ("minimum", rules.min),
        ("maximum", rules.max),
        ("exclusiveMinimum", rules.exclusive_min),
        ("exclusiveMaximum", rules.exclusive_max),
        ("multipleOf", rules.multiple_of),
    ];
    let counts = [
        ("minLength", rules.min_length),
        ("maxLength", rules.max_length),
        ("minItems", rules.min_items),
        ("maxItems", rules.max_items),
    ];
    for (key, value) in numbers {
        if let Some(v) = value {
            schema.insert(key.into(), json!(v));
        }
    }
    for (key, value) in counts {
        if let Some(v) = value {
            schema.insert(key.into(), json!(v));
        }
    }
    if let Some(pattern) = &rules.pattern {
        schema.insert("pattern".into(), json!(pattern));
    }
    if let Some(format) = &rules.format {
        schema.insert("format".into(), json!(format));
    }
    if rules.unique_items {
        schema.insert("uniqueItems".into(), json!(true));
    }
    if !rules.allowed.is_empty() {
        schema.insert("enum".into(), json!(rules.allowed));
    }
}

/// `Map of K to V`, recursing into nested map values.
fn map_description(key: &str, value: &FieldType) -> String {
    let value_desc = match &value.shape {
        TypeShape::Named { name } => name.clone(),
        TypeShape::Array { items } => format!("array of {}", structural_signature(items)),
        TypeShape::Map { key, value } => map_description(key, value),
    };
    format!("Map of {key} to {value_desc}")
}

impl OpenApiExporter {
    fn build_components(
        &self,
        schema: &Schema,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Result<ComponentsObject, ResolveError> {
        let mut schemas = IndexMap::new();

        for e in &schema.enums {
            let name = scope.names.declared_name(&e.namespace, &e.name);
            schemas.insert(name, self.enum_schema(e));
        }
        for t in &schema.types {
            let name = scope.names.declared_name(&t.namespace, &t.name);
            let object = self.object_schema(t, &scope.within(&t.namespace), warnings)?;
            schemas.insert(name, object);
        }
        for u in &schema.unions {
            let name = scope.names.declared_name(&u.namespace, &u.name);
            let union = self.render_union(u, &scope.within(&u.namespace))?;
            schemas.insert(name, union);
        }

        Ok(ComponentsObject { schemas })
    }

    fn enum_schema(&self, e: &EnumDef) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("string"));
        schema.insert(
            "enum".into(),
            json!(e.values.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()),
        );
        if let Some(doc) = doc_text(e.doc.as_ref()) {
            schema.insert("description".into(), json!(doc));
        }
        Value::Object(schema)
    }

    fn object_schema(
        &self,
        ty: &TypeDef,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Result<Value, ResolveError> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in ty.included_fields(TARGET) {
            properties.insert(field.name.clone(), self.property(field, scope, warnings)?);
            if field.is_non_null() {
                required.push(field.name.clone());
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if let Some(doc) = doc_text(ty.doc.as_ref()) {
            schema.insert("description".into(), json!(doc));
        }
        if !properties.is_empty() {
            schema.insert("properties".into(), Value::Object(properties));
        }
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        apply_extensions(&mut schema, ty.annotations.options_for(TARGET));
        Ok(Value::Object(schema))
    }

    /// Schema of one field. A plain reference prints as a bare `$ref`;
    /// everything else carries docs, deprecation, validation and extensions.
    fn property(
        &self,
        field: &Field,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Result<Value, ResolveError> {
        if let TypeShape::Named { name } = &field.field_type.shape {
            if !is_builtin_scalar(name) {
                return Ok(schema_ref(&scope.reference(name)?));
            }
        }

        let mut property = Map::new();
        let mut description = doc_text(field.doc.as_ref()).unwrap_or_default();
        if let Some(deprecation) = &field.deprecated {
            property.insert("deprecated".into(), json!(true));
            if !description.is_empty() {
                description.push_str("\n\n");
            }
            description.push_str("**DEPRECATED**");
            description.push_str(&deprecation.version_note());
            if let Some(reason) = &deprecation.reason {
                description.push_str(&format!(": {reason}"));
            }
        }
        if let Some(rules) = &field.validation {
            apply_validation(&mut property, rules);
        }
        apply_extensions(&mut property, field.annotations.options_for(TARGET));

        match &field.field_type.shape {
            TypeShape::Named { name } => {
                let (ty, format) = scalar_schema(name);
                property.insert("type".into(), json!(ty));
                if let Some(format) = format {
                    property.insert("format".into(), json!(format));
                }
                if is_unsigned(name) && !property.contains_key("minimum") {
                    property.insert("minimum".into(), json!(0));
                }
                if let Some(default) = &field.default {
                    property.insert("default".into(), typed_default(default, name));
                }
            }
            TypeShape::Array { items } => {
                property.insert("type".into(), json!("array"));
                property.insert("items".into(), self.item_schema(items, scope, warnings)?);
            }
            TypeShape::Map { key, value } => {
                let map = self.synthesize_map(key, value, scope, warnings);
                if let Value::Object(map) = map {
                    for (k, v) in map {
                        if k == "description" && !description.is_empty() {
                            continue;
                        }
                        property.insert(k, v);
                    }
                }
            }
        }

        if !description.is_empty() {
            property.insert("description".into(), json!(description));
        }
        Ok(Value::Object(property))
    }

    /// Schema of an array element.
    fn item_schema(
        &self,
        items: &FieldType,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Result<Value, ResolveError> {
        match &items.shape {
            TypeShape::Named { name } if is_builtin_scalar(name) => Ok(scalar_value(name)),
            TypeShape::Named { name } => Ok(schema_ref(&scope.reference(name)?)),
            TypeShape::Array { items } => Ok(json!({
                "type": "array",
                "items": self.item_schema(items, scope, warnings)?,
            })),
            TypeShape::Map { key, value } => Ok(self.synthesize_map(key, value, scope, warnings)),
        }
    }

    /// Recursive `additionalProperties` for a map value.
    fn additional_properties(
        &self,
        value: &FieldType,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Value {
        match classify_value(value, scope) {
            MapValue::Scalar(name) => scalar_value(name),
            MapValue::Declared(entry) => schema_ref(&scope.print(entry)),
            MapValue::Map { value, .. } => json!({
                "type": "object",
                "additionalProperties": self.additional_properties(value, scope, warnings),
            }),
            MapValue::Array(items) => json!({
                "type": "array",
                "items": self.additional_properties(items, scope, warnings),
            }),
            MapValue::Unknown(name) => {
                warnings.unknown_value(name, scope.namespace);
                json!({ "description": "unknown value type" })
            }
        }
    }
}

impl MapSynthesis for OpenApiExporter {
    type State = MapWarnings;
    type Output = Value;

    fn synthesize_map(
        &self,
        key: &str,
        value: &FieldType,
        scope: &RenderScope<'_>,
        state: &mut MapWarnings,
    ) -> Value {
        json!({
            "type": "object",
            "description": map_description(key, value),
            "additionalProperties": self.additional_properties(value, scope, state),
        })
    }
}

impl UnionRendering for OpenApiExporter {
    type Output = Value;

    fn render_union(&self, union: &UnionDef, scope: &RenderScope<'_>) -> Result<Value, ResolveError> {
        let mut one_of = Vec::with_capacity(union.options.len());
        let mut mapping = Map::new();
        for option in &union.options {
            let name = scope.reference(option)?;
            one_of.push(schema_ref(&name));
            mapping.insert(name.clone(), json!(format!("#/components/schemas/{name}")));
        }

        let mut schema = Map::new();
        if let Some(doc) = doc_text(union.doc.as_ref()) {
            schema.insert("description".into(), json!(doc));
        }
        schema.insert("oneOf".into(), Value::Array(one_of));
        schema.insert(
            "discriminator".into(),
            json!({ "propertyName": DISCRIMINATOR_PROPERTY, "mapping": mapping }),
        );
        apply_extensions(&mut schema, union.annotations.options_for(TARGET));
        Ok(Value::Object(schema))
    }
}
