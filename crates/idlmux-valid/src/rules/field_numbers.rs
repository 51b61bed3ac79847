use std::collections::HashMap;

use idlmux_ir::numbering::{check_collisions, number_fields};
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::{ErrorEntry, ValidationReport, E_NUMBERING_COLLISION};

/// Targets that put wire tags on the wire.
const NUMBERED_TARGETS: &[Target] = &[Target::Protobuf];

/// Check that wire tags stay pairwise distinct per numbered target, for
/// fields and for enum values.
pub fn check(schema: &Schema, targets: &[Target], report: &mut ValidationReport) {
    for target in targets.iter().filter(|t| NUMBERED_TARGETS.contains(t)) {
        for (i, ty) in schema.types.iter().enumerate() {
            let numbered = number_fields(ty, *target);
            if let Err(collision) = check_collisions(&ty.name, &numbered) {
                report.push(
                    ErrorEntry::error(
                        E_NUMBERING_COLLISION,
                        format!("{collision} in {target} output"),
                        "",
                        &format!("$.types[{i}].fields"),
                    )
                    .with_suggestion("Give each field a distinct explicit number"),
                );
            }
        }
    }

    for (i, e) in schema.enums.iter().enumerate() {
        let mut seen: HashMap<i32, &str> = HashMap::new();
        for value in &e.values {
            let Some(number) = value.number else { continue };
            if let Some(first) = seen.insert(number, &value.name) {
                report.push(ErrorEntry::error(
                    E_NUMBERING_COLLISION,
                    format!(
                        "values '{first}' and '{}' of enum '{}' both use number {number}",
                        value.name, e.name
                    ),
                    "",
                    &format!("$.enums[{i}].values"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use idlmux_spec::types::definitions::{EnumDef, EnumValue, Field, FieldType, TypeDef};

    fn field(name: &str) -> Field {
        Field::new(name, FieldType::named("string"))
    }

    #[test]
    fn test_excluded_number_reuse_is_not_a_collision() {
        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("User", "ns")
                .with_field(field("a").numbered(1))
                .with_field(field("b").numbered(2).excluded_from(Target::Protobuf))
                .with_field(field("c")),
        );
        let mut report = ValidationReport::success();
        check(&schema, &Target::ALL, &mut report);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_explicit_duplicate_numbers_collide() {
        let mut schema = Schema::new("ns");
        schema.types.push(
            TypeDef::new("User", "ns")
                .with_field(field("a").numbered(3))
                .with_field(field("b").numbered(3)),
        );
        let mut report = ValidationReport::success();
        check(&schema, &[Target::Protobuf], &mut report);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, E_NUMBERING_COLLISION);
        assert!(report.errors[0].message.contains("'a' and 'b'"));

        // Unnumbered targets don't care.
        let mut report = ValidationReport::success();
        check(&schema, &[Target::Graphql], &mut report);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_enum_value_collision() {
        let mut schema = Schema::new("ns");
        let mut low = EnumValue::new("LOW");
        low.number = Some(1);
        let mut high = EnumValue::new("HIGH");
        high.number = Some(1);
        schema.enums.push(EnumDef {
            name: "Priority".to_string(),
            namespace: "ns".to_string(),
            values: vec![low, high],
            ..EnumDef::default()
        });
        let mut report = ValidationReport::success();
        check(&schema, &[], &mut report);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "$.enums[0].values");
    }
}
