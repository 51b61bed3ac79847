use jsonschema::Validator;
use schemars::schema_for;

use crate::types::config::GeneratorConfig;
use crate::types::definitions::Schema;
use crate::types::error::{ErrorEntry, E_SCHEMA_VIOLATION};

/// Generate a JSON Schema for model documents.
pub fn generate_model_schema() -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(schema_for!(Schema))
}

/// Generate a JSON Schema for `GeneratorConfig`.
pub fn generate_config_schema() -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(schema_for!(GeneratorConfig))
}

/// Validate a JSON value against a JSON Schema, returning errors in `ErrorEntry` format.
pub fn validate_against_schema(
    value: &serde_json::Value,
    schema: &serde_json::Value,
    file: &str,
) -> Vec<ErrorEntry> {
    let compiled = match Validator::new(schema) {
        Ok(v) => v,
        Err(e) => {
            return vec![ErrorEntry::error(
                E_SCHEMA_VIOLATION,
                format!("Invalid schema: {e}"),
                file,
                "$",
            )];
        }
    };

    compiled
        .iter_errors(value)
        .map(|err| {
            let instance_path = err.instance_path.as_str();
            let path = if instance_path.is_empty() {
                "$".to_string()
            } else {
                format!("${}", instance_path.replace('/', "."))
            };
            ErrorEntry::error(E_SCHEMA_VIOLATION, err.to_string(), file, &path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_model_json() -> serde_json::Value {
        serde_json::json!({
            "namespace": "com.example",
            "enums": [{ "name": "Role", "values": [{ "name": "ADMIN" }, { "name": "USER", "number": 5 }] }],
            "types": [{
                "name": "User",
                "namespace": "com.example",
                "fields": [
                    { "name": "id", "type": { "kind": "named", "name": "string" }, "required": true },
                    { "name": "tags", "type": { "kind": "array", "items": { "kind": "named", "name": "string" } } },
                    { "name": "meta", "type": { "kind": "map", "key": "string", "value": { "kind": "named", "name": "int32" } } }
                ]
            }],
            "services": [{
                "name": "UserService",
                "methods": [{ "name": "GetUser", "input": "GetUserRequest", "output": "User" }]
            }]
        })
    }

    #[test]
    fn test_valid_model_passes() {
        let schema = generate_model_schema().unwrap();
        let errors = validate_against_schema(&valid_model_json(), &schema, "user.idl.json");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_missing_type_name_is_violation() {
        let schema = generate_model_schema().unwrap();
        let mut value = valid_model_json();
        value["types"][0].as_object_mut().unwrap().remove("name");

        let errors = validate_against_schema(&value, &schema, "user.idl.json");
        assert!(!errors.is_empty());
        assert_eq!(errors[0].code, E_SCHEMA_VIOLATION);
        assert_eq!(errors[0].file, "user.idl.json");
        assert!(errors[0].path.starts_with("$.types.0"));
    }

    #[test]
    fn test_unknown_target_is_violation() {
        let schema = generate_model_schema().unwrap();
        let mut value = valid_model_json();
        value["types"][0]["fields"][0]["excludeFrom"] = serde_json::json!(["thrift"]);

        let errors = validate_against_schema(&value, &schema, "");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_config_schema_accepts_empty_object() {
        let schema = generate_config_schema().unwrap();
        let errors = validate_against_schema(&serde_json::json!({}), &schema, "");
        assert!(errors.is_empty());
    }
}
