use idlmux_spec::types::common::{Severity, Target};
use idlmux_spec::types::definitions::{Field, FieldType, Schema, TypeDef, UnionDef};
use idlmux_spec::types::error::{E_DUPLICATE_SYMBOL, E_EMPTY_UNION, E_INVALID_VERSION, E_UNKNOWN_SYMBOL};
use idlmux_valid::{validate, ValidateOptions};
use pretty_assertions::assert_eq;

fn broken_model() -> Schema {
    let mut schema = Schema::new("");
    schema.version = Some("one".to_string());
    schema.types.push(TypeDef::new("User", "accounts"));
    schema.types.push(
        TypeDef::new("User", "billing")
            .with_field(Field::new("plan", FieldType::named("Plan"))),
    );
    schema.unions.push(UnionDef {
        name: "Nothing".to_string(),
        namespace: "billing".to_string(),
        ..UnionDef::default()
    });
    schema
}

#[test]
fn test_all_rules_contribute() {
    let report = validate(&broken_model(), &ValidateOptions::default());
    assert!(report.has_errors());

    assert_eq!(report.with_code(E_UNKNOWN_SYMBOL).count(), 1);
    assert_eq!(report.with_code(E_EMPTY_UNION).count(), 1);
    assert_eq!(report.with_code(E_INVALID_VERSION).count(), 1);
    // proto, graphql and openapi all flatten namespaces by default
    assert_eq!(report.with_code(E_DUPLICATE_SYMBOL).count(), 3);
    assert_eq!(report.count(Severity::Warning), 1);
}

#[test]
fn test_split_proto_and_target_selection() {
    let options = ValidateOptions {
        targets: vec![Target::Protobuf],
        split_proto: true,
    };
    let report = validate(&broken_model(), &options);
    assert_eq!(report.with_code(E_DUPLICATE_SYMBOL).count(), 0);
    assert_eq!(report.with_code(E_UNKNOWN_SYMBOL).count(), 1);
}
