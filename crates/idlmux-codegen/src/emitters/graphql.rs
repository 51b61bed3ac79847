use idlmux_ir::maps::{classify_value, structural_signature, MapValue};
use idlmux_ir::naming::{lower_first, upper_first};
use idlmux_ir::{MapSynthesis, NameTable, Qualification, RenderScope, UnionRendering, UsageMap};
use idlmux_spec::registry::{Registry, ResolveError, SymbolEntry, SymbolKind};
use idlmux_spec::types::annotations::Documentation;
use idlmux_spec::types::common::{OperationKind, Target};
use idlmux_spec::types::definitions::{
    EnumDef, Field, FieldType, Method, Schema, TypeDef, TypeShape, UnionDef,
};
use idlmux_spec::types::error::ErrorEntry;

use crate::context::{EmitContext, EntryType, IndentStyle, MapTypeArena, WrapperType};
use crate::error::CodegenError;
use crate::traits::{Emission, SchemaEmitter};

const TARGET: Target = Target::Graphql;
const INDENT: IndentStyle = IndentStyle::Spaces(2);
const INPUT_SUFFIX: &str = "Input";
const UNKNOWN_VALUE: &str = "UnknownValue";

fn scalar(name: &str) -> Option<&'static str> {
    Some(match name {
        "string" | "timestamp" | "bytes" => "String",
        "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64" => "Int",
        "float32" | "float64" => "Float",
        "bool" => "Boolean",
        _ => return None,
    })
}

/// Which half of a dual declaration is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Output,
    Input,
}

/// The two declarations a union turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDeclarations {
    /// `union U = A | B`
    pub output: String,
    /// `input UInput @oneOf { .. }`
    pub input: String,
}

/// Declarative-disjunction rendering: unions become a `union` plus a
/// `@oneOf` input, maps become lists of synthesized entry types.
#[derive(Debug, Clone)]
pub struct GraphqlEmitter {
    filename: String,
}

impl Default for GraphqlEmitter {
    fn default() -> Self {
        Self::new("schema.graphql")
    }
}

impl GraphqlEmitter {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// Render the SDL document and the warnings collected on the way.
    pub fn render(
        &self,
        schema: &Schema,
        registry: &Registry,
    ) -> Result<(String, Vec<ErrorEntry>), CodegenError> {
        let names = NameTable::build(schema, TARGET);
        if let Some(conflict) = names.flat_conflicts(registry).into_iter().next() {
            return Err(CodegenError::DuplicateSymbol {
                name: conflict.name,
                namespaces: conflict.namespaces,
            });
        }
        let scope = RenderScope::new(registry, &names, Qualification::Flat);
        let mut arena = MapTypeArena::new(UsageMap::classify(schema, registry, TARGET));

        let enums: Vec<String> = schema
            .enums
            .iter()
            .map(|e| self.enum_block(e, &scope))
            .collect();

        let mut objects = Vec::new();
        for t in &schema.types {
            let scope = scope.within(&t.namespace);
            objects.push(self.object_block(t, Direction::Output, &scope, &mut arena)?);
            if arena.usage().needs_input_variant(&t.namespace, &t.name) {
                objects.push(self.object_block(t, Direction::Input, &scope, &mut arena)?);
            }
        }

        let mut unions = Vec::new();
        for u in &schema.unions {
            let rendered = self.render_union(u, &scope.within(&u.namespace))?;
            unions.push(rendered.output);
            unions.push(rendered.input);
        }

        let roots = self.root_blocks(schema, &scope, &arena)?;

        let mut sections = vec![header(schema), "directive @oneOf on INPUT_OBJECT".to_string()];
        let extensions = schema.namespace_annotations.options_for(TARGET);
        if !extensions.is_empty() {
            sections.push(
                extensions
                    .iter()
                    .map(|d| format!("extend schema {d}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        if arena.uses_unknown_value() {
            sections.push(format!(
                "\"Placeholder for map values without a GraphQL representation\"\nscalar {UNKNOWN_VALUE}"
            ));
        }
        for wrapper in arena.wrappers() {
            sections.push(wrapper_block(wrapper, Direction::Output));
            sections.push(wrapper_block(wrapper, Direction::Input));
        }
        for entry in arena.entries() {
            sections.push(entry_block(entry, Direction::Output));
            sections.push(entry_block(entry, Direction::Input));
        }

        tracing::debug!(
            entries = arena.entries().count(),
            wrappers = arena.wrappers().len(),
            objects = objects.len(),
            roots = roots.len(),
            "rendered graphql schema"
        );

        sections.extend(enums);
        sections.extend(objects);
        sections.extend(unions);
        sections.extend(roots);

        let mut text = sections.join("\n\n");
        text.push('\n');
        Ok((text, arena.take_warnings()))
    }

    fn enum_block(&self, e: &EnumDef, scope: &RenderScope<'_>) -> String {
        let ctx = indented();
        let mut lines: Vec<String> = description(e.doc.as_ref()).into_iter().collect();
        lines.push(format!(
            "enum {} {{",
            scope.names.declared_name(&e.namespace, &e.name)
        ));
        lines.extend(e.values.iter().map(|v| ctx.line(&v.name)));
        lines.push("}".to_string());
        lines.join("\n")
    }

    fn object_block(
        &self,
        t: &TypeDef,
        direction: Direction,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> Result<String, ResolveError> {
        let declared = scope.names.declared_name(&t.namespace, &t.name);
        let heading = match direction {
            Direction::Output => {
                let directives = t.annotations.options_for(TARGET);
                if directives.is_empty() {
                    format!("type {declared} {{")
                } else {
                    format!("type {declared} {} {{", directives.join(" "))
                }
            }
            Direction::Input => format!("input {declared}{INPUT_SUFFIX} {{"),
        };

        let ctx = indented();
        let mut lines: Vec<String> = description(t.doc.as_ref()).into_iter().collect();
        lines.push(heading);
        for field in t.included_fields(TARGET) {
            let ty = self.field_type(field, direction, scope, arena)?;
            let mut parts = vec![format!("{}: {ty}", field.name)];
            if direction == Direction::Output {
                parts.extend(field_directives(field));
            }
            lines.push(ctx.line(parts.join(" ")));
        }
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    /// Field type with list wrapping and the non-null marker. Maps become a
    /// list of their entry type.
    fn field_type(
        &self,
        field: &Field,
        direction: Direction,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> Result<String, ResolveError> {
        let ty = self.shape(&field.field_type, direction, scope, arena)?;
        Ok(if field.is_non_null() { format!("{ty}!") } else { ty })
    }

    fn shape(
        &self,
        ft: &FieldType,
        direction: Direction,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> Result<String, ResolveError> {
        Ok(match &ft.shape {
            TypeShape::Named { name } => named(name, direction, scope, arena.usage())?,
            TypeShape::Array { items } => format!("[{}]", self.shape(items, direction, scope, arena)?),
            TypeShape::Map { key, value } => {
                let entry = self.synthesize_map(key, value, scope, arena);
                format!("[{}!]", directed(&entry, direction))
            }
        })
    }

    /// Wrapper for the nested map `inner`, allocated on first sight of its
    /// structural signature.
    fn wrap_nested(
        &self,
        inner: &FieldType,
        key: &str,
        value: &FieldType,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> String {
        let signature = structural_signature(inner);
        if let Some(existing) = arena.wrapper_for(&signature) {
            return existing.to_string();
        }
        let index = arena.allocate_wrapper(signature);
        let entry = self.synthesize_map(key, value, scope, arena);
        arena.complete_wrapper(index, entry);
        arena.wrapper_name(index).to_string()
    }

    /// `(output, input, label)` spellings of a list-valued map's element.
    fn list_element(
        &self,
        items: &FieldType,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> (String, String, String) {
        let TypeShape::Named { name } = &items.shape else {
            arena.unknown_value(&structural_signature(items), scope.namespace);
            return placeholder();
        };
        if let Some(s) = scalar(name) {
            return (s.to_string(), s.to_string(), s.to_string());
        }
        match scope.resolve(name) {
            Ok(entry) => declared_value(entry, scope, arena.usage()),
            Err(_) => {
                arena.unknown_value(name, scope.namespace);
                placeholder()
            }
        }
    }

    fn root_blocks(
        &self,
        schema: &Schema,
        scope: &RenderScope<'_>,
        arena: &MapTypeArena,
    ) -> Result<Vec<String>, ResolveError> {
        let ctx = indented();
        let mut roots: [(&str, Vec<String>); 3] = [
            ("Query", Vec::new()),
            ("Mutation", Vec::new()),
            ("Subscription", Vec::new()),
        ];
        for s in &schema.services {
            let scope = scope.within(&s.namespace);
            for m in &s.methods {
                let slot = match m.operation_kind() {
                    OperationKind::Query => 0,
                    OperationKind::Mutation => 1,
                    OperationKind::Subscription => 2,
                };
                roots[slot].1.push(ctx.line(root_field(m, &scope, arena.usage())?));
            }
        }

        Ok(roots
            .into_iter()
            .filter(|(_, fields)| !fields.is_empty())
            .map(|(name, fields)| format!("type {name} {{\n{}\n}}", fields.join("\n")))
            .collect())
    }
}

impl MapSynthesis for GraphqlEmitter {
    type State = MapTypeArena;
    /// Name of the entry type
    type Output = String;

    fn synthesize_map(
        &self,
        key: &str,
        value: &FieldType,
        scope: &RenderScope<'_>,
        arena: &mut MapTypeArena,
    ) -> String {
        let key_type = scalar(key).unwrap_or("String");
        let (output, input, label) = match classify_value(value, scope) {
            MapValue::Scalar(name) => {
                let s = scalar(name).unwrap_or("String");
                (s.to_string(), s.to_string(), s.to_string())
            }
            MapValue::Declared(entry) => declared_value(entry, scope, arena.usage()),
            MapValue::Map {
                key: inner_key,
                value: inner_value,
            } => {
                let wrapper = self.wrap_nested(value, inner_key, inner_value, scope, arena);
                (wrapper.clone(), format!("{wrapper}{INPUT_SUFFIX}"), wrapper)
            }
            MapValue::Array(items) => {
                let (output, input, label) = self.list_element(items, scope, arena);
                (format!("[{output}]"), format!("[{input}]"), format!("{label}List"))
            }
            MapValue::Unknown(name) => {
                arena.unknown_value(name, scope.namespace);
                placeholder()
            }
        };

        arena.intern_entry(EntryType {
            name: format!("{}{}Entry", upper_first(key_type), upper_first(&label)),
            key: key_type.to_string(),
            value: output,
            value_input: input,
            described: format!("map<{key}, {}>", structural_signature(value)),
        })
    }
}

impl UnionRendering for GraphqlEmitter {
    type Output = UnionDeclarations;

    /// The output disjunction plus a `@oneOf` input with one optional field
    /// per option.
    fn render_union(
        &self,
        union: &UnionDef,
        scope: &RenderScope<'_>,
    ) -> Result<UnionDeclarations, ResolveError> {
        let name = scope.names.declared_name(&union.namespace, &union.name);
        let doc = union
            .doc
            .as_ref()
            .and_then(|d| d.for_target(TARGET))
            .map(single_line);

        let mut members = Vec::new();
        let mut input_fields = Vec::new();
        let ctx = indented();
        for option in &union.options {
            let entry = scope.resolve(option)?;
            let printed = scope.print(entry);
            let input = if entry.kind == SymbolKind::Enum {
                printed.clone()
            } else {
                format!("{printed}{INPUT_SUFFIX}")
            };
            input_fields.push(ctx.line(format!("{}: {input}", lower_first(&entry.name))));
            members.push(printed);
        }

        let mut output: Vec<String> = doc.iter().map(|d| quoted(d)).collect();
        output.push(format!("union {name} = {}", members.join(" | ")));

        let mut input: Vec<String> = doc
            .iter()
            .map(|d| quoted(&format!("{d} (Input variant with @oneOf)")))
            .collect();
        input.push(format!("input {name}{INPUT_SUFFIX} @oneOf {{"));
        input.extend(input_fields);
        input.push("}".to_string());

        Ok(UnionDeclarations {
            output: output.join("\n"),
            input: input.join("\n"),
        })
    }
}

impl SchemaEmitter for GraphqlEmitter {
    fn target(&self) -> Target {
        TARGET
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn emit(&self, schema: &Schema, registry: &Registry) -> Result<Emission, CodegenError> {
        let (text, warnings) = self.render(schema, registry)?;
        Ok(Emission::single(&self.filename, text, warnings))
    }

    fn diagnostic_document(&self, error: &CodegenError) -> String {
        format!(
            "# ERROR: {error}\n\
             # GraphQL does not support multiple types with the same name.\n\
             # Please rename one of the conflicting types or use separate GraphQL schemas.\n"
        )
    }
}

fn indented() -> EmitContext {
    let mut ctx = EmitContext::new(INDENT);
    ctx.push_indent();
    ctx
}

fn header(schema: &Schema) -> String {
    if schema.namespace.is_empty() {
        "# Generated GraphQL Schema".to_string()
    } else {
        format!("# Generated GraphQL Schema\n# Namespace: {}", schema.namespace)
    }
}

fn directed(name: &str, direction: Direction) -> String {
    match direction {
        Direction::Output => name.to_string(),
        Direction::Input => format!("{name}{INPUT_SUFFIX}"),
    }
}

fn placeholder() -> (String, String, String) {
    (
        UNKNOWN_VALUE.to_string(),
        UNKNOWN_VALUE.to_string(),
        UNKNOWN_VALUE.to_string(),
    )
}

/// Whether `entry` is emitted with an `Input` companion.
fn has_input_variant(entry: &SymbolEntry, usage: &UsageMap) -> bool {
    match entry.kind {
        SymbolKind::Type => usage.needs_input_variant(&entry.namespace, &entry.name),
        SymbolKind::Union => true,
        SymbolKind::Enum => false,
    }
}

/// Reference to a scalar or declared type in the given direction.
fn named(
    name: &str,
    direction: Direction,
    scope: &RenderScope<'_>,
    usage: &UsageMap,
) -> Result<String, ResolveError> {
    if let Some(s) = scalar(name) {
        return Ok(s.to_string());
    }
    let entry = scope.resolve(name)?;
    let printed = scope.print(entry);
    Ok(match direction {
        Direction::Input if has_input_variant(entry, usage) => format!("{printed}{INPUT_SUFFIX}"),
        _ => printed,
    })
}

fn declared_value(
    entry: &SymbolEntry,
    scope: &RenderScope<'_>,
    usage: &UsageMap,
) -> (String, String, String) {
    let printed = scope.print(entry);
    let input = if has_input_variant(entry, usage) {
        format!("{printed}{INPUT_SUFFIX}")
    } else {
        printed.clone()
    };
    (printed.clone(), input, printed)
}

fn root_field(
    m: &Method,
    scope: &RenderScope<'_>,
    usage: &UsageMap,
) -> Result<String, ResolveError> {
    let input = named(&m.input, Direction::Input, scope, usage)?;
    let output = named(&m.output, Direction::Output, scope, usage)?;
    Ok(format!("{}(input: {input}): {output}", lower_first(&m.name)))
}

fn field_directives(field: &Field) -> Vec<String> {
    let mut directives = Vec::new();
    if let Some(deprecation) = &field.deprecated {
        directives.push(match &deprecation.reason {
            Some(reason) => format!("@deprecated(reason: {})", quoted(reason)),
            None => "@deprecated".to_string(),
        });
    }
    directives.extend(field.annotations.options_for(TARGET).iter().cloned());
    directives
}

fn wrapper_block(wrapper: &WrapperType, direction: Direction) -> String {
    let name = directed(&wrapper.name, direction);
    let keyword = keyword(direction);
    format!(
        "{}\n{keyword} {name} {{\n  value: [{}!]!\n}}",
        quoted(&format!("{name} is an auto-generated wrapper for nested map")),
        directed(&wrapper.entry, direction)
    )
}

fn entry_block(entry: &EntryType, direction: Direction) -> String {
    let name = directed(&entry.name, direction);
    let value = match direction {
        Direction::Output => &entry.value,
        Direction::Input => &entry.value_input,
    };
    format!(
        "{}\n{} {name} {{\n  key: {}!\n  value: {value}!\n}}",
        quoted(&format!("{name} represents a key-value pair for {}", entry.described)),
        keyword(direction),
        entry.key
    )
}

fn keyword(direction: Direction) -> &'static str {
    match direction {
        Direction::Output => "type",
        Direction::Input => "input",
    }
}

fn description(doc: Option<&Documentation>) -> Option<String> {
    doc.and_then(|d| d.for_target(TARGET))
        .map(|text| quoted(&single_line(text)))
}

fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
