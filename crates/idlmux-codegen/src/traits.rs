use idlmux_spec::registry::Registry;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::ErrorEntry;

use crate::error::CodegenError;

/// Text produced by one emission, plus its non-fatal diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emission {
    /// `(relative path, text)` pairs
    pub files: Vec<(String, String)>,
    pub diagnostics: Vec<ErrorEntry>,
}

impl Emission {
    pub fn single(path: impl Into<String>, text: String, diagnostics: Vec<ErrorEntry>) -> Self {
        Self {
            files: vec![(path.into(), text)],
            diagnostics,
        }
    }
}

/// Target-specific schema emitter.
///
/// Each target format implements this trait to turn a model into one or
/// more documents. Emitters hold configuration only; every piece of
/// per-emission state is created inside `emit`.
pub trait SchemaEmitter: Send + Sync {
    /// Which format this emitter produces.
    fn target(&self) -> Target;

    /// Relative path of the main output document.
    fn filename(&self) -> &str;

    /// Render the model. The registry must have been built from `schema`.
    fn emit(&self, schema: &Schema, registry: &Registry) -> Result<Emission, CodegenError>;

    /// Document written in place of the output when emission short-circuits
    /// on `error`.
    fn diagnostic_document(&self, error: &CodegenError) -> String;
}
