use idlmux_openapi::{export_openapi, to_json, to_yaml, ExportOptions};
use idlmux_spec::registry::Registry;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::config::DocumentFormat;
use idlmux_spec::types::definitions::Schema;

use crate::error::CodegenError;
use crate::traits::{Emission, SchemaEmitter};

/// Serializes the exported OpenAPI document as YAML or JSON.
#[derive(Debug, Clone)]
pub struct OpenApiEmitter {
    filename: String,
    options: ExportOptions,
    format: DocumentFormat,
}

impl Default for OpenApiEmitter {
    fn default() -> Self {
        Self::new("openapi.yaml", ExportOptions::default(), DocumentFormat::Yaml)
    }
}

impl OpenApiEmitter {
    pub fn new(filename: impl Into<String>, options: ExportOptions, format: DocumentFormat) -> Self {
        Self {
            filename: filename.into(),
            options,
            format,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

impl SchemaEmitter for OpenApiEmitter {
    fn target(&self) -> Target {
        Target::OpenApi
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn emit(&self, schema: &Schema, registry: &Registry) -> Result<Emission, CodegenError> {
        let export = export_openapi(schema, registry, &self.options)?;
        let text = match self.format {
            DocumentFormat::Yaml => to_yaml(&export.document)?,
            DocumentFormat::Json => {
                let mut json = to_json(&export.document)?;
                json.push('\n');
                json
            }
        };
        Ok(Emission::single(&self.filename, text, export.warnings))
    }

    fn diagnostic_document(&self, error: &CodegenError) -> String {
        match self.format {
            DocumentFormat::Yaml => format!(
                "# ERROR: {error}\n\
                 # OpenAPI component schemas share one namespace.\n\
                 # Please rename one of the conflicting types or give it an openapi name override.\n"
            ),
            DocumentFormat::Json => {
                format!("{:#}\n", serde_json::json!({ "error": error.to_string() }))
            }
        }
    }
}
