use std::collections::BTreeMap;
use std::path::Path;

use idlmux_spec::registry::Registry;
use idlmux_spec::types::common::{Severity, Target};
use idlmux_spec::types::config::GeneratorConfig;
use idlmux_spec::types::definitions::Schema;
use idlmux_spec::types::error::{ErrorEntry, ValidationReport};

use crate::emitters;
use crate::error::CodegenError;
use crate::traits::SchemaEmitter;

/// Generated documents keyed by relative path, plus the diagnostics raised
/// while producing them.
#[derive(Debug, Clone, Default)]
pub struct GeneratedOutput {
    /// Files keyed by relative path (sorted for deterministic output)
    files: BTreeMap<String, String>,
    diagnostics: Vec<ErrorEntry>,
}

impl GeneratedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the output.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Number of generated files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn diagnostics(&self) -> &[ErrorEntry] {
        &self.diagnostics
    }

    /// Whether any target failed or was short-circuited.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|e| e.severity == Severity::Error)
    }

    /// Diagnostics as a report, for printing alongside validation results.
    pub fn report(&self) -> ValidationReport {
        ValidationReport::from_errors(self.diagnostics.clone())
    }

    /// Write all generated files under `output_dir`, creating directories as
    /// needed.
    pub fn write_to_disk(&self, output_dir: &Path) -> Result<(), CodegenError> {
        for (rel_path, content) in &self.files {
            let full_path = output_dir.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }
        tracing::debug!(files = self.files.len(), dir = %output_dir.display(), "wrote generated files");
        Ok(())
    }
}

/// Drives one emitter per requested target over a shared registry.
///
/// Targets are independent: a target that fails contributes an error entry
/// (and, for duplicate names, a diagnostic document) while the others still
/// produce their output.
pub struct CodeGenerator {
    emitters: Vec<Box<dyn SchemaEmitter>>,
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("targets", &self.targets())
            .finish()
    }
}

impl CodeGenerator {
    /// Create a generator for the configured targets. Repeated targets are
    /// emitted once.
    pub fn new(config: &GeneratorConfig) -> Result<Self, CodegenError> {
        let mut emitters: Vec<Box<dyn SchemaEmitter>> = Vec::new();
        for &target in &config.output.targets {
            if emitters.iter().any(|e| e.target() == target) {
                continue;
            }
            emitters.push(emitters::create_emitter(target, config)?);
        }
        Ok(Self { emitters })
    }

    /// Create a generator for `targets` with default settings.
    pub fn for_targets(targets: &[Target]) -> Result<Self, CodegenError> {
        let mut config = GeneratorConfig::default();
        config.output.targets = targets.to_vec();
        Self::new(&config)
    }

    pub fn targets(&self) -> Vec<Target> {
        self.emitters.iter().map(|e| e.target()).collect()
    }

    /// Generate every target from `schema`.
    pub fn generate(&self, schema: &Schema) -> GeneratedOutput {
        let (registry, duplicates) = Registry::build(schema);
        let mut output = GeneratedOutput::new();
        output.diagnostics.extend(duplicates);

        for emitter in &self.emitters {
            let target = emitter.target();
            match emitter.emit(schema, &registry) {
                Ok(emission) => {
                    tracing::debug!(
                        %target,
                        files = emission.files.len(),
                        warnings = emission.diagnostics.len(),
                        "emitted target"
                    );
                    for (path, text) in emission.files {
                        output.add_file(path, text);
                    }
                    output.diagnostics.extend(emission.diagnostics);
                }
                Err(err) if err.is_short_circuit() => {
                    tracing::warn!(%target, error = %err, "emission short-circuited");
                    output.add_file(emitter.filename(), emitter.diagnostic_document(&err));
                    output.diagnostics.push(err.to_entry(target));
                }
                Err(err) => {
                    tracing::warn!(%target, error = %err, "emission failed");
                    output.diagnostics.push(err.to_entry(target));
                }
            }
        }
        output
    }
}
