//! schemagen: data-access code generation from tagged Rust structs
//!
//! Scans a directory of Rust source for structs whose fields carry
//! `#[db = "..."]` and `#[rel = "..."]` tags, builds and validates an entity
//! model, and renders table/column constants, repositories, query builders
//! and relationship loaders for it.

pub mod codegen;
pub mod error;
pub mod model;
pub mod naming;
pub mod scanner;
pub mod tags;
pub mod validate;

mod util;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use codegen::{ArtifactKind, FileWriter, FsWriter, RustTemplates, TemplateRenderer};
use model::ModelRegistry;
use scanner::{ScanFailure, ScanOptions};
use tags::TagParser;
use validate::{ValidationIssue, ValidationReport};

pub use error::SchemaGenError;

/// Package name used when none is given
pub const DEFAULT_PACKAGE: &str = "models";

/// Options for a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory holding the tagged declarations
    pub input_dir: PathBuf,
    /// Directory receiving the generated files
    pub output_dir: PathBuf,
    /// Package/module name recorded in the generated files
    pub package: String,
    /// Artifact kinds to produce
    pub artifacts: Vec<ArtifactKind>,
    pub scan: ScanOptions,
    /// Fixed timestamp for reproducible output; `None` uses the current time
    pub generated_at: Option<DateTime<Utc>>,
}

impl GenerateOptions {
    /// All artifacts, default package, non-recursive scan
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            package: DEFAULT_PACKAGE.to_string(),
            artifacts: ArtifactKind::ALL.to_vec(),
            scan: ScanOptions::default(),
            generated_at: None,
        }
    }
}

/// A scanned, built and validated model
#[derive(Debug)]
pub struct CompiledModel {
    pub registry: ModelRegistry,
    pub report: ValidationReport,
    /// Files and declarations the scan skipped
    pub skipped: Vec<ScanFailure>,
    pub files_scanned: usize,
}

/// What a generation run produced
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub entities: usize,
    /// Paths written, in render order
    pub files: Vec<PathBuf>,
    pub warnings: Vec<ValidationIssue>,
    pub skipped: Vec<ScanFailure>,
}

/// Scan, build and validate. Validation problems are returned in the report,
/// not as an error; relationship targets are resolved only when the report
/// is valid.
pub fn compile_model(input_dir: &Path, scan: &ScanOptions) -> Result<CompiledModel> {
    info!(input = %input_dir.display(), "Scanning declarations");
    let scanned = scanner::scan_directory(input_dir, scan)?;

    let mut parser = TagParser::new();
    let mut registry = model::build_model(&scanned.declarations, &mut parser)?;
    let stats = parser.stats();
    debug!(hits = stats.hits, misses = stats.misses, "tag cache");

    let report = validate::validate_model(&registry);
    for issue in &report.warnings {
        warn!("{}", issue);
    }
    if report.is_valid() {
        registry.resolve_relationship_targets();
    }

    info!(
        entities = registry.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Model compiled"
    );

    Ok(CompiledModel {
        registry,
        report,
        skipped: scanned.skipped,
        files_scanned: scanned.files_scanned,
    })
}

/// Generate with the built-in renderer, writing to the filesystem.
pub fn generate(options: &GenerateOptions) -> Result<GenerationSummary> {
    generate_with(options, &RustTemplates, &FsWriter)
}

/// Generate with a caller-supplied renderer and writer.
///
/// An invalid model fails with [`SchemaGenError::ValidationFailed`] before
/// anything is rendered. Every artifact is rendered before the first write.
pub fn generate_with(
    options: &GenerateOptions,
    renderer: &dyn TemplateRenderer,
    writer: &dyn FileWriter,
) -> Result<GenerationSummary> {
    let compiled = compile_model(&options.input_dir, &options.scan)?;
    if !compiled.report.is_valid() {
        return Err(SchemaGenError::ValidationFailed {
            report: compiled.report,
        }
        .into());
    }

    let generated_at = options.generated_at.unwrap_or_else(Utc::now);
    let artifacts = codegen::render_artifacts(
        &compiled.registry,
        &options.artifacts,
        &options.package,
        generated_at,
        renderer,
    )?;
    let files = codegen::write_artifacts(&artifacts, &options.output_dir, writer)?;

    info!(
        files = files.len(),
        output = %options.output_dir.display(),
        "Generated code"
    );

    Ok(GenerationSummary {
        entities: compiled.registry.len(),
        files,
        warnings: compiled.report.warnings,
        skipped: compiled.skipped,
    })
}

/// Remove previously generated files from `output_dir`.
pub fn clean(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let removed = codegen::clean_generated(output_dir)?;
    info!(
        removed = removed.len(),
        output = %output_dir.display(),
        "Cleaned generated files"
    );
    Ok(removed)
}
