use idlmux_ir::NameTable;
use idlmux_spec::registry::Registry;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::{ErrorEntry, ValidationReport, E_DUPLICATE_SYMBOL};

/// Check that no two declarations share an emitted name in a target
/// without namespaces. Per-target name overrides are applied first.
pub fn check(
    schema: &Schema,
    registry: &Registry,
    flat_targets: &[Target],
    report: &mut ValidationReport,
) {
    for target in flat_targets {
        let names = NameTable::build(schema, *target);
        for conflict in names.flat_conflicts(registry) {
            report.push(
                ErrorEntry::error(
                    E_DUPLICATE_SYMBOL,
                    format!(
                        "duplicate type name '{}' found in namespaces: {} ({target} output)",
                        conflict.name,
                        conflict.namespaces.join(", ")
                    ),
                    "",
                    "$",
                )
                .with_suggestion(format!(
                    "Rename one of the declarations or add a {target} name override"
                )),
            );
        }
    }
}
