pub mod error;
pub mod export;
pub mod types;

pub use error::OpenApiError;
pub use export::{export_openapi, to_json, to_yaml, ExportOptions, OpenApiExport, OpenApiExporter};
pub use types::OpenApiDocument;
