use std::collections::HashSet;

use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::{
    ErrorEntry, ValidationReport, E_DUPLICATE_UNION_OPTION, E_EMPTY_UNION,
};

/// Check that every union lists at least one option, each only once.
/// Option kinds are checked with the other references.
pub fn check(schema: &Schema, report: &mut ValidationReport) {
    for (i, union) in schema.unions.iter().enumerate() {
        let path = format!("$.unions[{i}].options");
        if union.options.is_empty() {
            report.push(
                ErrorEntry::error(
                    E_EMPTY_UNION,
                    format!("Union '{}' has no options", union.name),
                    "",
                    &path,
                )
                .with_suggestion("List at least one option type"),
            );
            continue;
        }

        let mut seen = HashSet::new();
        for (j, option) in union.options.iter().enumerate() {
            if !seen.insert(option.as_str()) {
                report.push(
                    ErrorEntry::warning(
                        E_DUPLICATE_UNION_OPTION,
                        format!("Union '{}' lists option '{option}' more than once", union.name),
                        "",
                        &format!("{path}[{j}]"),
                    )
                    .with_suggestion(format!("Remove the repeated '{option}'")),
                );
            }
        }
    }
}
