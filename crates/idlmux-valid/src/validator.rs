use idlmux_spec::registry::Registry;
use idlmux_spec::resolver::Resolver;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::ValidationReport;

use crate::rules;

/// Which emissions the model is validated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    pub targets: Vec<Target>,
    /// Proto emitted one file per namespace (no flat symbol space)
    pub split_proto: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            targets: Target::ALL.to_vec(),
            split_proto: false,
        }
    }
}

impl ValidateOptions {
    /// Targets that put every declaration into one symbol space.
    pub fn flat_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .copied()
            .filter(|t| *t != Target::Protobuf || !self.split_proto)
            .collect()
    }
}

/// Validate a model before emission.
/// Runs all validation rules and returns a consolidated report.
pub fn validate(schema: &Schema, options: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::success();

    let (registry, registry_errors) = Registry::build(schema);
    for err in registry_errors {
        report.push(err);
    }

    let resolver = Resolver::new(&registry);

    rules::ref_integrity::check(schema, &resolver, &mut report);
    rules::union_options::check(schema, &mut report);
    rules::map_keys::check(schema, &mut report);
    rules::field_numbers::check(schema, &options.targets, &mut report);
    rules::duplicate_names::check(schema, &registry, &options.flat_targets(), &mut report);
    rules::version_check::check(schema, &mut report);

    tracing::debug!(
        errors = report.errors.len(),
        ok = report.ok,
        "validation finished"
    );
    report
}

/// Validate only reference integrity (useful for targeted checking)
pub fn validate_refs(schema: &Schema) -> ValidationReport {
    let mut report = ValidationReport::success();
    let (registry, registry_errors) = Registry::build(schema);
    for err in registry_errors {
        report.push(err);
    }
    let resolver = Resolver::new(&registry);
    rules::ref_integrity::check(schema, &resolver, &mut report);
    report
}
