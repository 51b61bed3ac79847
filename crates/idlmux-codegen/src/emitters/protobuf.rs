use std::collections::{BTreeMap, BTreeSet};

use idlmux_ir::maps::{classify_value, structural_signature, MapValue, MapWarnings};
use idlmux_ir::namespace::{effective_namespace, import_path, partition, required_imports};
use idlmux_ir::naming::lower_first;
use idlmux_ir::numbering::check_collisions;
use idlmux_ir::{FieldNumbering, MapSynthesis, NameTable, Qualification, RenderScope, UnionRendering};
use idlmux_spec::registry::{Registry, ResolveError};
use idlmux_spec::types::annotations::{Documentation, ValidationRules};
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::{
    EnumDef, Field, FieldType, Schema, ServiceDef, TypeDef, TypeShape, UnionDef,
};
use idlmux_spec::types::error::ErrorEntry;

use crate::context::{EmitContext, IndentStyle};
use crate::error::CodegenError;
use crate::traits::{Emission, SchemaEmitter};

const TARGET: Target = Target::Protobuf;
const INDENT: IndentStyle = IndentStyle::Spaces(2);
const EXTENSION: &str = "proto";
const TIMESTAMP_IMPORT: &str = "google/protobuf/timestamp.proto";
const VALIDATE_IMPORT: &str = "buf/validate/validate.proto";
const VALIDATE_RULE: &str = "(buf.validate.field)";
/// Spelling for map values proto cannot express
const PLACEHOLDER: &str = "bytes";

/// proto3 spelling of a builtin scalar.
fn scalar(name: &str) -> Option<&'static str> {
    Some(match name {
        "string" => "string",
        "int32" => "int32",
        "int64" => "int64",
        "uint8" | "uint16" | "uint32" => "uint32",
        "uint64" => "uint64",
        "float32" => "float",
        "float64" => "double",
        "bool" => "bool",
        "timestamp" => "google.protobuf.Timestamp",
        "bytes" => "bytes",
        _ => return None,
    })
}

/// How declarations are spread over `.proto` files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtoLayout {
    /// One file, one package
    #[default]
    SingleFile,
    /// One file and package per namespace, importing each other
    PerNamespace,
}

/// One rendered `.proto` file
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoFile {
    pub text: String,
    pub warnings: Vec<ErrorEntry>,
}

/// Tagged-variant rendering: unions become a `oneof`, maps stay native.
#[derive(Debug, Clone)]
pub struct ProtobufEmitter {
    filename: String,
    layout: ProtoLayout,
}

impl Default for ProtobufEmitter {
    fn default() -> Self {
        Self::new("schema.proto", ProtoLayout::SingleFile)
    }
}

impl ProtobufEmitter {
    pub fn new(filename: impl Into<String>, layout: ProtoLayout) -> Self {
        Self {
            filename: filename.into(),
            layout,
        }
    }

    pub fn layout(&self) -> ProtoLayout {
        self.layout
    }

    /// Render the whole model into a single package named after the model's
    /// namespace. Emitted names share that package and must be unique.
    pub fn render_single(
        &self,
        schema: &Schema,
        registry: &Registry,
    ) -> Result<ProtoFile, CodegenError> {
        let names = NameTable::build(schema, TARGET);
        if let Some(conflict) = names.flat_conflicts(registry).into_iter().next() {
            return Err(CodegenError::DuplicateSymbol {
                name: conflict.name,
                namespaces: conflict.namespaces,
            });
        }
        let scope = RenderScope::new(registry, &names, Qualification::Flat);
        self.render_file(schema, effective_namespace(&schema.namespace), &[], &scope)
    }

    /// Render one file per namespace, keyed by namespace.
    pub fn render_by_namespace(
        &self,
        schema: &Schema,
        registry: &Registry,
    ) -> Result<BTreeMap<String, ProtoFile>, CodegenError> {
        let names = NameTable::build(schema, TARGET);
        if let Some(conflict) = names.namespace_conflicts(registry).into_iter().next() {
            return Err(CodegenError::DuplicateSymbol {
                name: conflict.name,
                namespaces: conflict.namespaces,
            });
        }
        let scope = RenderScope::new(registry, &names, Qualification::ByNamespace);

        partition(schema)
            .into_iter()
            .map(|(namespace, part)| {
                let imports: Vec<String> = required_imports(&part, registry, TARGET)
                    .iter()
                    .map(|ns| import_path(ns, EXTENSION))
                    .collect();
                let file = self.render_file(&part, &namespace, &imports, &scope)?;
                Ok((namespace, file))
            })
            .collect()
    }

    fn render_file(
        &self,
        part: &Schema,
        package: &str,
        file_imports: &[String],
        scope: &RenderScope<'_>,
    ) -> Result<ProtoFile, CodegenError> {
        let mut ctx = EmitContext::new(INDENT);
        let mut warnings = MapWarnings::default();
        for path in file_imports {
            ctx.add_import(path.as_str());
        }
        if uses_timestamp(part) {
            ctx.add_import(TIMESTAMP_IMPORT);
        }

        let mut blocks = Vec::new();
        for e in &part.enums {
            blocks.push(self.enum_block(e, scope, &mut ctx));
        }
        for t in &part.types {
            blocks.push(self.message_block(t, &scope.within(&t.namespace), &mut ctx, &mut warnings)?);
        }
        for u in &part.unions {
            blocks.push(self.render_union(u, &scope.within(&u.namespace))?);
        }
        for s in &part.services {
            blocks.push(self.service_block(s, &scope.within(&s.namespace), &mut ctx)?);
        }

        let mut sections = vec![
            "syntax = \"proto3\";".to_string(),
            format!("package {package};"),
        ];
        let options = part.namespace_annotations.options_for(TARGET);
        if !options.is_empty() {
            sections.push(
                options
                    .iter()
                    .map(|o| format!("option {o};"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        let imports: BTreeSet<String> = ctx.take_imports().into_iter().collect();
        if !imports.is_empty() {
            sections.push(
                imports
                    .iter()
                    .map(|i| format!("import \"{i}\";"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        tracing::debug!(
            package,
            blocks = blocks.len(),
            imports = imports.len(),
            "rendered proto file"
        );
        sections.extend(blocks);

        let mut text = sections.join("\n\n");
        text.push('\n');
        Ok(ProtoFile {
            text,
            warnings: warnings.take(),
        })
    }

    fn enum_block(&self, e: &EnumDef, scope: &RenderScope<'_>, ctx: &mut EmitContext) -> String {
        let mut lines = doc_lines(e.doc.as_ref(), ctx);
        lines.push(format!(
            "enum {} {{",
            scope.names.declared_name(&e.namespace, &e.name)
        ));
        ctx.push_indent();
        let numbering = self.number_enum(e);
        if let Some(sentinel) = &numbering.sentinel {
            lines.push(ctx.line(format!("{sentinel} = 0;")));
        }
        for (value, number) in &numbering.values {
            lines.extend(doc_lines(value.doc.as_ref(), ctx));
            lines.push(ctx.line(format!("{} = {number};", value.name)));
        }
        ctx.pop_indent();
        lines.push("}".to_string());
        lines.join("\n")
    }

    fn message_block(
        &self,
        t: &TypeDef,
        scope: &RenderScope<'_>,
        ctx: &mut EmitContext,
        warnings: &mut MapWarnings,
    ) -> Result<String, CodegenError> {
        let name = scope.names.declared_name(&t.namespace, &t.name);
        let numbered = self.number_fields(t);
        check_collisions(&name, &numbered)?;

        let mut lines = doc_lines(t.doc.as_ref(), ctx);
        lines.push(format!("message {name} {{"));
        ctx.push_indent();
        for nf in &numbered {
            let field = nf.field;
            lines.extend(doc_lines(field.doc.as_ref(), ctx));
            if let Some(deprecation) = &field.deprecated {
                lines.push(ctx.line(format!("// DEPRECATED{}", deprecation.version_note())));
                if let Some(reason) = &deprecation.reason {
                    lines.push(ctx.line(format!("// {reason}")));
                }
            }
            if let Some(since) = &field.since {
                lines.push(ctx.line(format!("// Added in version {since}")));
            }
            let declaration = self.field_declaration(field, nf.number, scope, ctx, warnings)?;
            lines.push(ctx.line(declaration));
        }
        ctx.pop_indent();
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    fn field_declaration(
        &self,
        field: &Field,
        number: u32,
        scope: &RenderScope<'_>,
        ctx: &mut EmitContext,
        warnings: &mut MapWarnings,
    ) -> Result<String, ResolveError> {
        let ty = match &field.field_type.shape {
            TypeShape::Map { key, value } => self.synthesize_map(key, value, scope, warnings),
            TypeShape::Array { items } => {
                format!("repeated {}", self.element_type(items, scope, warnings)?)
            }
            TypeShape::Named { name } => {
                let ty = type_reference(name, scope)?;
                if field.field_type.optional {
                    format!("optional {ty}")
                } else {
                    ty
                }
            }
        };

        let options = field_options(field, ctx);
        let options = if options.is_empty() {
            String::new()
        } else {
            format!(" [{}]", options.join(", "))
        };
        Ok(format!("{ty} {} = {number}{options};", field.name))
    }

    /// Element type of a `repeated` field. Nested lists and maps have no
    /// proto spelling.
    fn element_type(
        &self,
        items: &FieldType,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> Result<String, ResolveError> {
        match &items.shape {
            TypeShape::Named { name } => type_reference(name, scope),
            _ => {
                warnings.unknown_value(&structural_signature(items), scope.namespace);
                Ok(PLACEHOLDER.to_string())
            }
        }
    }

    fn service_block(
        &self,
        service: &ServiceDef,
        scope: &RenderScope<'_>,
        ctx: &mut EmitContext,
    ) -> Result<String, ResolveError> {
        let mut lines = doc_lines(service.doc.as_ref(), ctx);
        lines.push(format!("service {} {{", service.name));
        ctx.push_indent();
        for m in &service.methods {
            lines.extend(doc_lines(m.doc.as_ref(), ctx));
            let input = streamed(m.client_streaming, type_reference(&m.input, scope)?);
            let output = streamed(m.server_streaming, type_reference(&m.output, scope)?);
            lines.push(ctx.line(format!("rpc {}({input}) returns ({output});", m.name)));
        }
        ctx.pop_indent();
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }
}

impl FieldNumbering for ProtobufEmitter {
    const TARGET: Target = TARGET;
}

impl MapSynthesis for ProtobufEmitter {
    type State = MapWarnings;
    type Output = String;

    /// `map<K, V>`, nesting natively when the value is itself a map.
    fn synthesize_map(
        &self,
        key: &str,
        value: &FieldType,
        scope: &RenderScope<'_>,
        warnings: &mut MapWarnings,
    ) -> String {
        let rendered = match classify_value(value, scope) {
            MapValue::Scalar(name) => scalar(name).unwrap_or(PLACEHOLDER).to_string(),
            MapValue::Declared(entry) => scope.print(entry),
            MapValue::Map {
                key: inner_key,
                value: inner_value,
            } => self.synthesize_map(inner_key, inner_value, scope, warnings),
            MapValue::Array(_) => {
                warnings.unknown_value(&structural_signature(value), scope.namespace);
                PLACEHOLDER.to_string()
            }
            MapValue::Unknown(name) => {
                warnings.unknown_value(name, scope.namespace);
                PLACEHOLDER.to_string()
            }
        };
        format!("map<{}, {rendered}>", scalar(key).unwrap_or(key))
    }
}

impl UnionRendering for ProtobufEmitter {
    type Output = String;

    /// A wrapper message with one `oneof` member per option, numbered from 1
    /// in option order.
    fn render_union(&self, union: &UnionDef, scope: &RenderScope<'_>) -> Result<String, ResolveError> {
        let mut ctx = EmitContext::new(INDENT);
        let mut lines = doc_lines(union.doc.as_ref(), &ctx);
        lines.push(format!(
            "message {} {{",
            scope.names.declared_name(&union.namespace, &union.name)
        ));
        ctx.push_indent();
        lines.push(ctx.line("oneof value {"));
        ctx.push_indent();
        for (i, option) in union.options.iter().enumerate() {
            let entry = scope.resolve(option)?;
            lines.push(ctx.line(format!(
                "{} {} = {};",
                scope.print(entry),
                lower_first(&entry.name),
                i + 1
            )));
        }
        ctx.pop_indent();
        lines.push(ctx.line("}"));
        ctx.pop_indent();
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }
}

impl SchemaEmitter for ProtobufEmitter {
    fn target(&self) -> Target {
        TARGET
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn emit(&self, schema: &Schema, registry: &Registry) -> Result<Emission, CodegenError> {
        match self.layout {
            ProtoLayout::SingleFile => {
                let file = self.render_single(schema, registry)?;
                Ok(Emission::single(&self.filename, file.text, file.warnings))
            }
            ProtoLayout::PerNamespace => {
                let mut emission = Emission::default();
                for (namespace, file) in self.render_by_namespace(schema, registry)? {
                    emission
                        .files
                        .push((import_path(&namespace, EXTENSION), file.text));
                    emission.diagnostics.extend(file.warnings);
                }
                Ok(emission)
            }
        }
    }

    fn diagnostic_document(&self, error: &CodegenError) -> String {
        let remedy = match self.layout {
            ProtoLayout::SingleFile => {
                "rename one of the conflicting types or split the output by namespace"
            }
            ProtoLayout::PerNamespace => "rename one of the conflicting types",
        };
        format!(
            "// ERROR: {error}\n\
             // A single proto package cannot hold two declarations with the same name.\n\
             // Please {remedy}.\n"
        )
    }
}

fn doc_lines(doc: Option<&Documentation>, ctx: &EmitContext) -> Vec<String> {
    doc.and_then(|d| d.for_target(TARGET))
        .map(|text| {
            text.lines()
                .map(|line| ctx.line(format!("// {line}").trim_end()))
                .collect()
        })
        .unwrap_or_default()
}

fn type_reference(name: &str, scope: &RenderScope<'_>) -> Result<String, ResolveError> {
    match scalar(name) {
        Some(spelled) => Ok(spelled.to_string()),
        None => scope.reference(name),
    }
}

fn streamed(stream: bool, ty: String) -> String {
    if stream {
        format!("stream {ty}")
    } else {
        ty
    }
}

fn uses_timestamp(part: &Schema) -> bool {
    let in_fields = part
        .types
        .iter()
        .flat_map(|t| t.included_fields(TARGET))
        .any(|f| f.field_type.referenced_names().contains(&"timestamp"));
    let in_methods = part
        .services
        .iter()
        .flat_map(|s| &s.methods)
        .any(|m| m.input == "timestamp" || m.output == "timestamp");
    in_fields || in_methods
}

/// Field options: deprecation, buf-validate constraints, then custom options.
/// Registers the validate import when a constraint is emitted.
fn field_options(field: &Field, ctx: &mut EmitContext) -> Vec<String> {
    let mut options = Vec::new();
    if field.deprecated.is_some() {
        options.push("deprecated = true".to_string());
    }
    if let Some(rules) = &field.validation {
        let constraints = validation_constraints(&field.field_type, rules);
        if !constraints.is_empty() {
            ctx.add_import(VALIDATE_IMPORT);
            options.extend(constraints);
        }
    }
    options.extend(field.annotations.options_for(TARGET).iter().cloned());
    options
}

fn validation_constraints(ft: &FieldType, rules: &ValidationRules) -> Vec<String> {
    let mut out = Vec::new();
    match &ft.shape {
        TypeShape::Named { name } if name == "string" => string_constraints(rules, &mut out),
        TypeShape::Named { name } => numeric_constraints(name, rules, &mut out),
        TypeShape::Array { .. } => {
            if let Some(n) = rules.min_items {
                out.push(format!("{VALIDATE_RULE}.repeated.min_items = {n}"));
            }
            if let Some(n) = rules.max_items {
                out.push(format!("{VALIDATE_RULE}.repeated.max_items = {n}"));
            }
            if rules.unique_items {
                out.push(format!("{VALIDATE_RULE}.repeated.unique = true"));
            }
        }
        TypeShape::Map { .. } => {}
    }
    out
}

fn string_constraints(rules: &ValidationRules, out: &mut Vec<String>) {
    if let Some(n) = rules.min_length {
        out.push(format!("{VALIDATE_RULE}.string.min_len = {n}"));
    }
    if let Some(n) = rules.max_length {
        out.push(format!("{VALIDATE_RULE}.string.max_len = {n}"));
    }
    if let Some(pattern) = &rules.pattern {
        out.push(format!(
            "{VALIDATE_RULE}.string.pattern = \"{}\"",
            escape(pattern)
        ));
    }
    let format_rule = match rules.format.as_deref() {
        Some("email") => Some("email"),
        Some("uuid") => Some("uuid"),
        Some("uri" | "url") => Some("uri"),
        Some("hostname") => Some("hostname"),
        Some("ipv4") => Some("ipv4"),
        Some("ipv6") => Some("ipv6"),
        _ => None,
    };
    if let Some(rule) = format_rule {
        out.push(format!("{VALIDATE_RULE}.string.{rule} = true"));
    }
    if !rules.allowed.is_empty() {
        let quoted: Vec<String> = rules
            .allowed
            .iter()
            .map(|v| format!("\"{}\"", escape(v)))
            .collect();
        out.push(format!("{VALIDATE_RULE}.string.in = [{}]", quoted.join(", ")));
    }
}

fn numeric_constraints(name: &str, rules: &ValidationRules, out: &mut Vec<String>) {
    let (kind, integral) = match name {
        "int32" => ("int32", true),
        "int64" => ("int64", true),
        "uint8" | "uint16" | "uint32" => ("uint32", true),
        "uint64" => ("uint64", true),
        "float32" => ("float", false),
        "float64" => ("double", false),
        _ => return,
    };
    let bounds = [
        ("gte", rules.min),
        ("lte", rules.max),
        ("gt", rules.exclusive_min),
        ("lt", rules.exclusive_max),
    ];
    for (rule, bound) in bounds {
        if let Some(bound) = bound {
            let literal = if integral {
                (bound as i64).to_string()
            } else {
                bound.to_string()
            };
            out.push(format!("{VALIDATE_RULE}.{kind}.{rule} = {literal}"));
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlmux_spec::types::annotations::DeprecationInfo;
    use idlmux_spec::types::definitions::{EnumValue, Method};
    use pretty_assertions::assert_eq;

    fn single(schema: &Schema) -> ProtoFile {
        let (registry, _) = Registry::build(schema);
        ProtobufEmitter::default()
            .render_single(schema, &registry)
            .unwrap()
    }

    #[test]
    fn test_scalar_table() {
        assert_eq!(scalar("uint8"), Some("uint32"));
        assert_eq!(scalar("float32"), Some("float"));
        assert_eq!(scalar("float64"), Some("double"));
        assert_eq!(scalar("timestamp"), Some("google.protobuf.Timestamp"));
        assert_eq!(scalar("User"), None);
    }

    #[test]
    fn test_full_file_layout() {
        let mut schema = Schema::new("shop");
        schema.enums.push(EnumDef {
            name: "Status".to_string(),
            namespace: "shop".to_string(),
            values: vec![EnumValue::new("ACTIVE"), EnumValue::new("INACTIVE")],
            ..EnumDef::default()
        });
        schema.types.push(
            TypeDef::new("User", "shop")
                .with_field(Field::new("id", FieldType::named("string")).required())
                .with_field(Field::new("created", FieldType::named("timestamp")))
                .with_field(Field::new("tags", FieldType::array(FieldType::named("string"))))
                .with_field(Field::new("status", FieldType::named("Status").optional())),
        );

        let expected = "\
syntax = \"proto3\";

package shop;

import \"google/protobuf/timestamp.proto\";

enum Status {
  STATUS_UNSPECIFIED = 0;
  ACTIVE = 1;
  INACTIVE = 2;
}

message User {
  string id = 1;
  google.protobuf.Timestamp created = 2;
  repeated string tags = 3;
  optional Status status = 4;
}
";
        assert_eq!(single(&schema).text, expected);
    }

    #[test]
    fn test_no_timestamp_import_when_unused() {
        let mut schema = Schema::new("");
        schema
            .types
            .push(TypeDef::new("Ping", "").with_field(Field::new("n", FieldType::named("int32"))));
        let text = single(&schema).text;
        assert!(text.contains("package api;"));
        assert!(!text.contains("import"));
    }

    #[test]
    fn test_excluded_field_frees_number() {
        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("User", "ns")
                .with_field(Field::new("first", FieldType::named("string")).numbered(1))
                .with_field(
                    Field::new("secret", FieldType::named("string"))
                        .numbered(2)
                        .excluded_from(Target::Protobuf),
                )
                .with_field(Field::new("third", FieldType::named("string"))),
        );
        let text = single(&schema).text;
        assert!(text.contains("  string first = 1;"));
        assert!(text.contains("  string third = 2;"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_field_comments_and_options() {
        let mut legacy = Field::new("legacy", FieldType::named("string"));
        legacy.doc = Some(Documentation::new("Old contact"));
        legacy.deprecated = Some(DeprecationInfo {
            reason: Some("Use email".to_string()),
            since: Some("2.0.0".to_string()),
            removed: Some("3.0.0".to_string()),
        });
        legacy.since = Some("1.1.0".to_string());
        legacy.annotations.proto.options = vec!["json_name = \"old\"".to_string()];

        let mut schema = Schema::new("ns");
        schema.types.push(TypeDef::new("Contact", "ns").with_field(legacy));
        let text = single(&schema).text;

        let expected = "\
message Contact {
  // Old contact
  // DEPRECATED (since 2.0.0) - will be removed in 3.0.0
  // Use email
  // Added in version 1.1.0
  string legacy = 1 [deprecated = true, json_name = \"old\"];
}";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn test_validation_constraints_add_import() {
        let mut email = Field::new("email", FieldType::named("string"));
        email.validation = Some(ValidationRules {
            min_length: Some(3),
            pattern: Some("^\\S+@\\S+$".to_string()),
            format: Some("email".to_string()),
            ..ValidationRules::default()
        });
        let mut age = Field::new("age", FieldType::named("int32"));
        age.validation = Some(ValidationRules {
            min: Some(0.0),
            exclusive_max: Some(150.0),
            ..ValidationRules::default()
        });
        let mut score = Field::new("score", FieldType::named("float64"));
        score.validation = Some(ValidationRules {
            max: Some(1.5),
            ..ValidationRules::default()
        });
        let mut tags = Field::new("tags", FieldType::array(FieldType::named("string")));
        tags.validation = Some(ValidationRules {
            max_items: Some(10),
            unique_items: true,
            ..ValidationRules::default()
        });

        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("Profile", "ns")
                .with_field(email)
                .with_field(age)
                .with_field(score)
                .with_field(tags),
        );
        let text = single(&schema).text;

        assert!(text.contains("import \"buf/validate/validate.proto\";"));
        assert!(text.contains(
            "string email = 1 [(buf.validate.field).string.min_len = 3, \
             (buf.validate.field).string.pattern = \"^\\\\S+@\\\\S+$\", \
             (buf.validate.field).string.email = true];"
        ));
        assert!(text.contains(
            "int32 age = 2 [(buf.validate.field).int32.gte = 0, (buf.validate.field).int32.lt = 150];"
        ));
        assert!(text.contains("double score = 3 [(buf.validate.field).double.lte = 1.5];"));
        assert!(text.contains(
            "repeated string tags = 4 [(buf.validate.field).repeated.max_items = 10, \
             (buf.validate.field).repeated.unique = true];"
        ));
    }

    #[test]
    fn test_maps_native_and_placeholder() {
        let mut schema = Schema::new("ns");
        schema.types.push(TypeDef::new("Item", "ns"));
        schema.types.push(
            TypeDef::new("Bag", "ns")
                .with_field(Field::new("counts", FieldType::map("string", FieldType::named("uint16"))))
                .with_field(Field::new("items", FieldType::map("int64", FieldType::named("Item"))))
                .with_field(Field::new(
                    "nested",
                    FieldType::map("string", FieldType::map("string", FieldType::named("bool"))),
                ))
                .with_field(Field::new(
                    "lists",
                    FieldType::map("string", FieldType::array(FieldType::named("string"))),
                ))
                .with_field(Field::new("ghosts", FieldType::map("string", FieldType::named("Ghost")))),
        );
        let file = single(&schema);

        assert!(file.text.contains("map<string, uint32> counts = 1;"));
        assert!(file.text.contains("map<int64, Item> items = 2;"));
        assert!(file.text.contains("map<string, map<string, bool>> nested = 3;"));
        assert!(file.text.contains("map<string, bytes> lists = 4;"));
        assert!(file.text.contains("map<string, bytes> ghosts = 5;"));
        assert_eq!(file.warnings.len(), 2);
    }

    #[test]
    fn test_union_oneof_numbered_in_option_order() {
        let mut schema = Schema::new("chat");
        schema.types.push(TypeDef::new("TextMessage", "chat"));
        schema.types.push(TypeDef::new("ImageMessage", "chat"));
        schema.unions.push(UnionDef {
            name: "Message".to_string(),
            namespace: "chat".to_string(),
            options: vec!["ImageMessage".to_string(), "TextMessage".to_string()],
            doc: Some(Documentation::new("Any message")),
            ..UnionDef::default()
        });
        let expected = "\
// Any message
message Message {
  oneof value {
    ImageMessage imageMessage = 1;
    TextMessage textMessage = 2;
  }
}";
        assert!(single(&schema).text.contains(expected));
    }

    #[test]
    fn test_service_streaming() {
        let mut schema = Schema::new("feed");
        schema.types.push(TypeDef::new("Req", "feed"));
        schema.types.push(TypeDef::new("Event", "feed"));
        let mut watch = Method::new("Watch", "Req", "Event");
        watch.server_streaming = true;
        watch.doc = Some(Documentation::new("Live events"));
        let mut upload = Method::new("Upload", "Event", "Req");
        upload.client_streaming = true;
        schema.services.push(ServiceDef {
            name: "Feed".to_string(),
            namespace: "feed".to_string(),
            methods: vec![watch, upload],
            doc: None,
        });

        let expected = "\
service Feed {
  // Live events
  rpc Watch(Req) returns (stream Event);
  rpc Upload(stream Event) returns (Req);
}";
        assert!(single(&schema).text.contains(expected));
    }

    #[test]
    fn test_enum_explicit_zero_and_docs() {
        let mut schema = Schema::new("ns");
        schema.enums.push(EnumDef {
            name: "Priority".to_string(),
            namespace: "ns".to_string(),
            values: vec![
                EnumValue {
                    number: Some(0),
                    doc: Some(Documentation::new("Default")),
                    ..EnumValue::new("LOW")
                },
                EnumValue::new("HIGH"),
            ],
            ..EnumDef::default()
        });
        let expected = "\
enum Priority {
  // Default
  LOW = 0;
  HIGH = 1;
}";
        assert!(single(&schema).text.contains(expected));
    }

    #[test]
    fn test_single_file_rejects_flat_duplicates() {
        let mut schema = Schema::new("a");
        schema.types.push(TypeDef::new("User", "a"));
        schema.types.push(TypeDef::new("User", "b"));
        let (registry, _) = Registry::build(&schema);

        let err = ProtobufEmitter::default()
            .render_single(&schema, &registry)
            .unwrap_err();
        assert!(err.is_short_circuit());

        // Separate packages keep both.
        let files = ProtobufEmitter::default()
            .render_by_namespace(&schema, &registry)
            .unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_numbering_collision_aborts() {
        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("Clash", "ns")
                .with_field(Field::new("a", FieldType::named("string")).numbered(3))
                .with_field(Field::new("b", FieldType::named("string")).numbered(3)),
        );
        let (registry, _) = Registry::build(&schema);
        let err = ProtobufEmitter::default()
            .render_single(&schema, &registry)
            .unwrap_err();
        assert!(matches!(err, CodegenError::NumberingCollision(_)));
    }

    #[test]
    fn test_per_namespace_imports_and_qualified_references() {
        let mut schema = Schema::new("com.example.orders");
        schema.namespace_annotations.proto.options =
            vec!["go_package = \"example.com/orders\"".to_string()];
        let mut user = TypeDef::new("User", "com.example.users");
        user.annotations.proto.name = Some("Account".to_string());
        schema.types.push(user);
        schema.types.push(
            TypeDef::new("Order", "com.example.orders")
                .with_field(Field::new("owner", FieldType::named("com.example.users.User")))
                .with_field(Field::new("placed", FieldType::named("timestamp"))),
        );
        let (registry, _) = Registry::build(&schema);
        let files = ProtobufEmitter::new("unused.proto", ProtoLayout::PerNamespace)
            .render_by_namespace(&schema, &registry)
            .unwrap();

        let expected = "\
syntax = \"proto3\";

package com.example.orders;

option go_package = \"example.com/orders\";

import \"com/example/users.proto\";
import \"google/protobuf/timestamp.proto\";

message Order {
  com.example.users.Account owner = 1;
  google.protobuf.Timestamp placed = 2;
}
";
        assert_eq!(files["com.example.orders"].text, expected);
        assert!(files["com.example.users"].text.contains("message Account {"));
        assert!(!files["com.example.users"].text.contains("option"));
    }

    #[test]
    fn test_emit_per_namespace_paths() {
        let mut schema = Schema::new("a.b");
        schema.types.push(TypeDef::new("X", "a.b"));
        schema.types.push(TypeDef::new("Y", ""));
        let (registry, _) = Registry::build(&schema);
        let emission = ProtobufEmitter::new("schema.proto", ProtoLayout::PerNamespace)
            .emit(&schema, &registry)
            .unwrap();
        let paths: Vec<&str> = emission.files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["a/b.proto", "api.proto"]);
    }
}
