use idlmux_spec::types::definitions::{FieldType, Schema, TypeShape};
use idlmux_spec::types::error::{ErrorEntry, ValidationReport, E_INVALID_MAP_KEY};

/// Scalars every target accepts as a map key.
const MAP_KEY_SCALARS: &[&str] = &[
    "string", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "bool",
];

/// Check that every map key, at any nesting depth, is a keyable scalar.
pub fn check(schema: &Schema, report: &mut ValidationReport) {
    for (i, ty) in schema.types.iter().enumerate() {
        for (j, field) in ty.fields.iter().enumerate() {
            let path = format!("$.types[{i}].fields[{j}].type");
            check_shape(&field.field_type, &ty.name, &field.name, &path, report);
        }
    }
}

fn check_shape(
    field_type: &FieldType,
    type_name: &str,
    field_name: &str,
    path: &str,
    report: &mut ValidationReport,
) {
    match &field_type.shape {
        TypeShape::Named { .. } => {}
        TypeShape::Array { items } => check_shape(items, type_name, field_name, path, report),
        TypeShape::Map { key, value } => {
            if !MAP_KEY_SCALARS.contains(&key.as_str()) {
                report.push(
                    ErrorEntry::error(
                        E_INVALID_MAP_KEY,
                        format!("Map key type '{key}' of '{type_name}.{field_name}' is not a keyable scalar"),
                        "",
                        path,
                    )
                    .with_suggestion("Use string, bool, or an integer type as the map key"),
                );
            }
            check_shape(value, type_name, field_name, path, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use idlmux_spec::types::definitions::{Field, TypeDef};

    fn schema_with(field_type: FieldType) -> Schema {
        let mut schema = Schema::new("ns");
        schema
            .types
            .push(TypeDef::new("Holder", "ns").with_field(Field::new("m", field_type)));
        schema
    }

    #[test]
    fn test_scalar_keys_pass() {
        let mut report = ValidationReport::success();
        let nested = FieldType::map("int64", FieldType::map("bool", FieldType::named("string")));
        check(&schema_with(nested), &mut report);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_nested_bad_key_reported() {
        let mut report = ValidationReport::success();
        let nested = FieldType::array(FieldType::map(
            "string",
            FieldType::map("float64", FieldType::named("string")),
        ));
        check(&schema_with(nested), &mut report);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, E_INVALID_MAP_KEY);
        assert!(report.errors[0].message.contains("float64"));
    }
}
