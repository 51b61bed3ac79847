pub mod graphql;
pub mod openapi;
pub mod protobuf;

use idlmux_openapi::{ExportOptions, OpenApiError};
use idlmux_spec::types::common::Target;
use idlmux_spec::types::config::GeneratorConfig;

use crate::error::CodegenError;
use crate::traits::SchemaEmitter;

/// Output file name used when the configuration names none.
pub fn default_filename(target: Target, config: &GeneratorConfig) -> String {
    match target {
        Target::Protobuf => "schema.proto".to_string(),
        Target::Graphql => "schema.graphql".to_string(),
        Target::OpenApi => format!("openapi.{}", config.openapi.format.extension()),
    }
}

/// Create the emitter for `target`, configured from `config`.
pub fn create_emitter(
    target: Target,
    config: &GeneratorConfig,
) -> Result<Box<dyn SchemaEmitter>, CodegenError> {
    let filename = config
        .output
        .filenames
        .get(&target)
        .cloned()
        .unwrap_or_else(|| default_filename(target, config));

    match target {
        Target::Protobuf => {
            let layout = if config.proto.split_by_namespace {
                protobuf::ProtoLayout::PerNamespace
            } else {
                protobuf::ProtoLayout::SingleFile
            };
            Ok(Box::new(protobuf::ProtobufEmitter::new(filename, layout)))
        }
        Target::Graphql => Ok(Box::new(graphql::GraphqlEmitter::new(filename))),
        Target::OpenApi => {
            let version = &config.openapi.version;
            if !version.starts_with("3.") {
                return Err(OpenApiError::UnsupportedVersion(version.clone()).into());
            }
            Ok(Box::new(openapi::OpenApiEmitter::new(
                filename,
                ExportOptions {
                    openapi_version: version.clone(),
                },
                config.openapi.format,
            )))
        }
    }
}
