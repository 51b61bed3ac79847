use idlmux_spec::resolver::Resolver;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::ValidationReport;

/// Check that every reference in the model resolves to a declared symbol.
pub fn check(schema: &Schema, resolver: &Resolver, report: &mut ValidationReport) {
    // Field types, through arrays and map values
    for (i, ty) in schema.types.iter().enumerate() {
        for (j, field) in ty.fields.iter().enumerate() {
            let path = format!("$.types[{i}].fields[{j}].type");
            for err in resolver.check_field_type(&field.field_type, &ty.namespace, "", &path) {
                report.push(err);
            }
        }
    }

    // Union options must name object types
    for (i, union) in schema.unions.iter().enumerate() {
        for (j, option) in union.options.iter().enumerate() {
            let path = format!("$.unions[{i}].options[{j}]");
            if let Err(err) = resolver.resolve_object(option, &union.namespace, "", &path) {
                report.push(err);
            }
        }
    }

    // Method payloads
    for (i, service) in schema.services.iter().enumerate() {
        for (j, method) in service.methods.iter().enumerate() {
            for (side, name) in [("input", &method.input), ("output", &method.output)] {
                let path = format!("$.services[{i}].methods[{j}].{side}");
                if let Err(err) = resolver.resolve_object(name, &service.namespace, "", &path) {
                    report.push(err);
                }
            }
        }
    }
}
