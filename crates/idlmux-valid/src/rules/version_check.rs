use semver::Version;

use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::{ErrorEntry, ValidationReport, E_INVALID_VERSION};

/// Check that the declared model version is valid semver.
///
/// The version is carried into generated documents verbatim, so a bad
/// value is only a warning.
pub fn check(schema: &Schema, report: &mut ValidationReport) {
    let Some(version_str) = schema.version.as_deref() else {
        return;
    };

    if let Err(err) = Version::parse(version_str) {
        report.push(
            ErrorEntry::warning(
                E_INVALID_VERSION,
                format!("Invalid semver version '{version_str}': {err}"),
                "",
                "$.version",
            )
            .with_suggestion("Version should be valid semver (e.g., '1.0.0')"),
        );
    }
}
