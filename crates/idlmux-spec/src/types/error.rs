use serde::{Deserialize, Serialize};

use super::common::Severity;

// ── Error code constants ──

pub const E_UNRESOLVED_QUALIFIED_NAME: &str = "E_UNRESOLVED_QUALIFIED_NAME";
pub const E_UNKNOWN_SYMBOL: &str = "E_UNKNOWN_SYMBOL";
pub const E_AMBIGUOUS_SYMBOL: &str = "E_AMBIGUOUS_SYMBOL";
pub const E_DUPLICATE_SYMBOL: &str = "E_DUPLICATE_SYMBOL";
pub const E_NUMBERING_COLLISION: &str = "E_NUMBERING_COLLISION";
pub const E_UNKNOWN_VALUE_TYPE: &str = "E_UNKNOWN_VALUE_TYPE";
pub const E_EMPTY_UNION: &str = "E_EMPTY_UNION";
pub const E_DUPLICATE_UNION_OPTION: &str = "E_DUPLICATE_UNION_OPTION";
pub const E_DUPLICATE_OPERATION: &str = "E_DUPLICATE_OPERATION";
pub const E_INVALID_MAP_KEY: &str = "E_INVALID_MAP_KEY";
pub const E_INVALID_VERSION: &str = "E_INVALID_VERSION";
pub const E_PARSE_ERROR: &str = "E_PARSE_ERROR";
pub const E_SCHEMA_VIOLATION: &str = "E_SCHEMA_VIOLATION";
pub const E_EMIT_FAILED: &str = "E_EMIT_FAILED";

/// A single validation/parsing error entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Machine-readable stable error code
    pub code: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable error message
    pub message: String,
    /// Model document the entry refers to (empty for in-memory models)
    pub file: String,
    /// JSONPath to the offending declaration
    pub path: String,
    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Aggregated validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the model is valid (no errors, warnings are ok)
    pub ok: bool,
    /// All collected errors, warnings, and info entries
    pub errors: Vec<ErrorEntry>,
}

impl ValidationReport {
    /// Create a successful (empty) report
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// Create a report from a list of error entries
    pub fn from_errors(errors: Vec<ErrorEntry>) -> Self {
        let ok = !errors.iter().any(|e| e.severity == Severity::Error);
        Self { ok, errors }
    }

    /// Add an error entry and update the ok flag
    pub fn push(&mut self, entry: ErrorEntry) {
        if entry.severity == Severity::Error {
            self.ok = false;
        }
        self.errors.push(entry);
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for entry in other.errors {
            self.push(entry);
        }
    }

    /// Count errors of a specific severity
    pub fn count(&self, severity: Severity) -> usize {
        self.errors.iter().filter(|e| e.severity == severity).count()
    }

    /// Check if any errors exist (not warnings/info)
    pub fn has_errors(&self) -> bool {
        !self.ok
    }

    /// Entries carrying `code`.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ErrorEntry> {
        self.errors.iter().filter(move |e| e.code == code)
    }
}

impl ErrorEntry {
    /// Create a new error entry
    pub fn error(code: &str, message: impl Into<String>, file: &str, path: &str) -> Self {
        Self::with_severity(Severity::Error, code, message, file, path)
    }

    /// Create a warning entry
    pub fn warning(code: &str, message: impl Into<String>, file: &str, path: &str) -> Self {
        Self::with_severity(Severity::Warning, code, message, file, path)
    }

    fn with_severity(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        file: &str,
        path: &str,
    ) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            file: file.to_string(),
            path: path.to_string(),
            suggestion: None,
        }
    }

    /// Add a suggestion to this entry
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_entry_json_format() {
        let entry = ErrorEntry {
            code: E_UNKNOWN_SYMBOL.to_string(),
            severity: Severity::Error,
            message: "Unknown type 'Profile' referenced from 'com.example'".to_string(),
            file: "models/user.idl.json".to_string(),
            path: "$.types[0].fields[2].type".to_string(),
            suggestion: Some("Declare 'Profile' or qualify the reference".to_string()),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["code"], "E_UNKNOWN_SYMBOL");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["file"], "models/user.idl.json");
        assert_eq!(json["path"], "$.types[0].fields[2].type");
        assert_eq!(
            json["suggestion"],
            "Declare 'Profile' or qualify the reference"
        );
    }

    #[test]
    fn test_validation_report_success() {
        let report = ValidationReport::success();
        assert!(report.ok);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validation_report_from_errors() {
        let errors = vec![ErrorEntry::warning(
            E_UNKNOWN_VALUE_TYPE,
            "some warning",
            "",
            "$.types[0]",
        )];
        let report = ValidationReport::from_errors(errors);
        assert!(report.ok); // warnings don't make it fail

        let errors = vec![ErrorEntry::error(E_UNKNOWN_SYMBOL, "not found", "", "$")];
        let report = ValidationReport::from_errors(errors);
        assert!(!report.ok);
    }

    #[test]
    fn test_validation_report_merge_and_count() {
        let mut report1 = ValidationReport::success();
        let mut report2 = ValidationReport::success();
        report2.push(ErrorEntry::error(E_EMPTY_UNION, "empty", "", "$.unions[0]"));
        report2.push(ErrorEntry::warning(E_INVALID_VERSION, "odd", "", "$.version"));
        report1.merge(report2);
        assert!(!report1.ok);
        assert_eq!(report1.count(Severity::Error), 1);
        assert_eq!(report1.count(Severity::Warning), 1);
        assert_eq!(report1.with_code(E_EMPTY_UNION).count(), 1);
    }

    #[test]
    fn test_entry_without_suggestion_skips_in_json() {
        let entry = ErrorEntry::error(E_UNKNOWN_SYMBOL, "not found", "", "$");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("suggestion").is_none());
    }
}
