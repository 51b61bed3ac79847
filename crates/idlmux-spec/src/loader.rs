use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::parser::{self, ModelFileType};
use crate::schema_def;
use crate::types::config::{DocumentFormat, GeneratorConfig};
use crate::types::definitions::Schema;
use crate::types::error::{ErrorEntry, ValidationReport, E_PARSE_ERROR};

const CONFIG_FILES: &[&str] = &["idlmux.config.json", "idlmux.config.yaml", "idlmux.config.yml"];

/// A model assembled from one or more documents
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// File or directory the model was loaded from
    pub root: PathBuf,
    /// Generator config found next to the model, or defaults
    pub config: GeneratorConfig,
    /// Merged model
    pub schema: Schema,
    /// Relative paths of the documents that contributed to `schema`
    pub files: Vec<String>,
}

/// Load a model document, or every model document under a directory.
/// Accumulates per-document errors instead of failing on the first one.
#[allow(clippy::result_large_err)]
pub fn load_model(path: &Path) -> Result<(LoadedModel, ValidationReport), LoadError> {
    if path.is_file() {
        return load_single(path);
    }
    if !path.is_dir() {
        return Err(LoadError::NotFound(path.to_string_lossy().into_owned()));
    }

    let mut report = ValidationReport::success();
    let config = load_config(path)?;
    let model_schema = schema_def::generate_model_schema()?;

    let mut schema = Schema::default();
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let file_path = entry.path();
        let Some(ModelFileType::Model(format)) = parser::detect_file_type(file_path) else {
            continue;
        };
        let rel_path = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy()
            .into_owned();

        let content = match std::fs::read_to_string(file_path) {
            Ok(c) => c,
            Err(e) => {
                report.push(ErrorEntry::error(
                    E_PARSE_ERROR,
                    format!("Failed to read file: {e}"),
                    &rel_path,
                    "$",
                ));
                continue;
            }
        };

        if let Some(doc) = parse_document(&content, &rel_path, format, &model_schema, &mut report) {
            tracing::debug!(file = %rel_path, declarations = doc.declaration_count(), "loaded model document");
            merge_into(&mut schema, doc);
            files.push(rel_path);
        }
    }

    let model = LoadedModel {
        root: path.to_path_buf(),
        config,
        schema,
        files,
    };
    Ok((model, report))
}

#[allow(clippy::result_large_err)]
fn load_single(path: &Path) -> Result<(LoadedModel, ValidationReport), LoadError> {
    let format = parser::detect_format(path)
        .ok_or_else(|| LoadError::UnsupportedFile(path.to_string_lossy().into_owned()))?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(path.to_string_lossy().into_owned(), e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let config = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => load_config(dir)?,
        _ => GeneratorConfig::default(),
    };

    let mut report = ValidationReport::success();
    let model_schema = schema_def::generate_model_schema()?;
    let parsed = parse_document(&content, &file_name, format, &model_schema, &mut report);
    let files = if parsed.is_some() { vec![file_name] } else { Vec::new() };

    let model = LoadedModel {
        root: path.to_path_buf(),
        config,
        schema: parsed.unwrap_or_default(),
        files,
    };
    Ok((model, report))
}

/// Load `idlmux.config.*` from a directory, or defaults when absent.
#[allow(clippy::result_large_err)]
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, LoadError> {
    for name in CONFIG_FILES {
        let config_path = dir.join(name);
        if !config_path.is_file() {
            continue;
        }
        let format = parser::detect_format(&config_path).unwrap_or(DocumentFormat::Json);
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| LoadError::Io(config_path.to_string_lossy().into_owned(), e))?;
        return parser::parse_config(&content, name, format).map_err(LoadError::ConfigParseError);
    }
    Ok(GeneratorConfig::default())
}

fn parse_document(
    content: &str,
    file: &str,
    format: DocumentFormat,
    model_schema: &serde_json::Value,
    report: &mut ValidationReport,
) -> Option<Schema> {
    let value = match parser::parse_value(content, file, format) {
        Ok(v) => v,
        Err(entry) => {
            report.push(entry);
            return None;
        }
    };

    let violations = schema_def::validate_against_schema(&value, model_schema, file);
    if !violations.is_empty() {
        tracing::warn!(file, count = violations.len(), "model document violates schema");
        for v in violations {
            report.push(v);
        }
        return None;
    }

    match parser::model_from_value(value, file) {
        Ok(mut doc) => {
            doc.inherit_namespace();
            Some(doc)
        }
        Err(entry) => {
            report.push(entry);
            None
        }
    }
}

/// Append `doc`'s declarations; the first non-empty namespace and version win.
fn merge_into(schema: &mut Schema, doc: Schema) {
    if schema.namespace.is_empty() {
        schema.namespace = doc.namespace;
    }
    if schema.version.is_none() {
        schema.version = doc.version;
    }
    let ours = &mut schema.namespace_annotations;
    let theirs = doc.namespace_annotations;
    for (mine, other) in [
        (&mut ours.proto, theirs.proto),
        (&mut ours.graphql, theirs.graphql),
        (&mut ours.openapi, theirs.openapi),
    ] {
        if mine.name.is_none() {
            mine.name = other.name;
        }
        mine.options.extend(other.options);
    }
    schema.enums.extend(doc.enums);
    schema.types.extend(doc.types);
    schema.unions.extend(doc.unions);
    schema.services.extend(doc.services);
}

/// Errors that prevent loading entirely
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Model path not found: {0}")]
    NotFound(String),

    #[error("Unsupported model file (expected .json, .yaml or .yml): {0}")]
    UnsupportedFile(String),

    #[error("Failed to parse config: {0:?}")]
    ConfigParseError(ErrorEntry),

    #[error("Failed to build model schema: {0}")]
    SchemaGeneration(#[from] serde_json::Error),

    #[error("I/O error reading {0}: {1}")]
    Io(String, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error::E_SCHEMA_VIOLATION;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    const USERS: &str = r#"{
        "namespace": "com.example.users",
        "version": "1.2.0",
        "types": [{ "name": "User", "fields": [
            { "name": "id", "type": { "kind": "named", "name": "string" } }
        ]}]
    }"#;

    const ORDERS: &str = r#"
namespace: com.example.orders
types:
  - name: Order
    fields:
      - name: owner
        type: { kind: named, name: com.example.users.User }
"#;

    #[test]
    fn test_load_single_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "users.idl.json", USERS);

        let (model, report) = load_model(&tmp.path().join("users.idl.json")).unwrap();
        assert!(report.ok);
        assert_eq!(model.files, vec!["users.idl.json"]);
        assert_eq!(model.schema.types[0].namespace, "com.example.users");
    }

    #[test]
    fn test_load_directory_merges_documents() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "users.idl.json", USERS);
        write(tmp.path(), "nested/orders.idl.yaml", ORDERS);
        write(tmp.path(), "notes.txt", "ignored");

        let (model, report) = load_model(tmp.path()).unwrap();
        assert!(report.ok, "{:?}", report.errors);
        assert_eq!(model.files.len(), 2);
        assert_eq!(model.schema.types.len(), 2);
        // Documents are visited in name order: nested/ before users.idl.json.
        assert_eq!(model.schema.namespace, "com.example.orders");
        assert_eq!(model.schema.version.as_deref(), Some("1.2.0"));
        let order = model.schema.types.iter().find(|t| t.name == "Order").unwrap();
        assert_eq!(order.namespace, "com.example.orders");
    }

    #[test]
    fn test_load_accumulates_errors() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "users.idl.json", USERS);
        write(tmp.path(), "bad.idl.json", "{ invalid json }");
        write(
            tmp.path(),
            "violating.idl.json",
            r#"{ "types": [{ "fields": [] }] }"#,
        );

        let (model, report) = load_model(tmp.path()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.with_code(E_PARSE_ERROR).count(), 1);
        assert!(report.with_code(E_SCHEMA_VIOLATION).count() >= 1);
        // Good document was still loaded
        assert_eq!(model.schema.types.len(), 1);
    }

    #[test]
    fn test_load_config_from_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "users.idl.json", USERS);
        write(
            tmp.path(),
            "idlmux.config.json",
            r#"{ "output": { "directory": "build", "targets": ["graphql"] } }"#,
        );

        let (model, _) = load_model(tmp.path()).unwrap();
        assert_eq!(model.config.output.directory, "build");
        assert_eq!(model.config.output.targets.len(), 1);
    }

    #[test]
    fn test_load_invalid_config() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "idlmux.config.json", "not json");
        let err = load_model(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::ConfigParseError(_)));
    }

    #[test]
    fn test_load_nonexistent_path() {
        let err = load_model(Path::new("/nonexistent/path")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "model.toml", "x = 1");
        let err = load_model(&tmp.path().join("model.toml")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFile(_)));
    }
}
