//! Plan, render and write the artifact set

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{FileWriter, TemplateId, TemplatePayload, TemplateRenderer, GENERATED_MARKER};
use crate::error::SchemaGenError;
use crate::model::{EntityMetadata, ModelRegistry};
use crate::naming::to_snake_case;

/// Kinds of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Column descriptors for every entity (`columns.rs`)
    Columns,
    /// One repository per entity (`<entity>_repository.rs`)
    Repository,
    /// One query builder per entity (`<entity>_query.rs`)
    Query,
    /// Relationship loaders (`relations.rs`)
    Relations,
    /// Aggregate root (`mod.rs`)
    Root,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Columns,
        ArtifactKind::Repository,
        ArtifactKind::Query,
        ArtifactKind::Relations,
        ArtifactKind::Root,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Columns => "columns",
            ArtifactKind::Repository => "repository",
            ArtifactKind::Query => "query",
            ArtifactKind::Relations => "relations",
            ArtifactKind::Root => "root",
        }
    }

    pub fn template(&self) -> TemplateId {
        match self {
            ArtifactKind::Columns => TemplateId::Columns,
            ArtifactKind::Repository => TemplateId::Repository,
            ArtifactKind::Query => TemplateId::Query,
            ArtifactKind::Relations => TemplateId::Relations,
            ArtifactKind::Root => TemplateId::Root,
        }
    }

    /// Module name of a model-wide artifact
    pub fn model_module(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::Columns => Some("columns"),
            ArtifactKind::Relations => Some("relations"),
            ArtifactKind::Root => Some("mod"),
            ArtifactKind::Repository | ArtifactKind::Query => None,
        }
    }

    /// Module name of a per-entity artifact
    pub fn entity_module(&self, entity: &EntityMetadata) -> Option<String> {
        let snake = to_snake_case(&entity.name);
        match self {
            ArtifactKind::Repository => Some(format!("{}_repository", snake)),
            ArtifactKind::Query => Some(format!("{}_query", snake)),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "columns" => Ok(ArtifactKind::Columns),
            "repository" | "repositories" => Ok(ArtifactKind::Repository),
            "query" | "queries" => Ok(ArtifactKind::Query),
            "relations" | "relationships" => Ok(ArtifactKind::Relations),
            "root" | "mod" => Ok(ArtifactKind::Root),
            _ => Err(format!(
                "Unknown artifact kind: {} (expected columns, repository, query, relations or root)",
                s
            )),
        }
    }
}

/// One rendered file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// `kind` or `kind:Entity`, used in logs and errors
    pub label: String,
    /// File name relative to the output directory
    pub file_name: String,
    pub contents: String,
}

/// Inputs shared by every template in one run
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub package: &'a str,
    pub generated_at: DateTime<Utc>,
    pub artifacts: &'a [ArtifactKind],
}

/// Render every requested artifact in memory. Nothing is written here, so a
/// failure leaves the output directory untouched.
///
/// Kinds are deduplicated and rendered in canonical order. `relations` is
/// skipped when no entity declares a relationship.
pub fn render_artifacts(
    registry: &ModelRegistry,
    kinds: &[ArtifactKind],
    package: &str,
    generated_at: DateTime<Utc>,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<Artifact>, SchemaGenError> {
    let mut planned: Vec<ArtifactKind> = kinds.to_vec();
    planned.sort();
    planned.dedup();

    if planned.contains(&ArtifactKind::Relations)
        && registry.entities_with_relationships().next().is_none()
    {
        info!("No relationships declared, skipping relations artifact");
        planned.retain(|k| *k != ArtifactKind::Relations);
    }

    let ctx = RenderContext {
        package,
        generated_at,
        artifacts: &planned,
    };

    let mut artifacts = Vec::new();
    for kind in &planned {
        match kind.model_module() {
            Some(module) => {
                let label = kind.to_string();
                let contents = render_one(*kind, &label, registry, None, &ctx, renderer)?;
                artifacts.push(Artifact {
                    kind: *kind,
                    label,
                    file_name: format!("{}.rs", module),
                    contents,
                });
            }
            None => {
                for entity in registry.iter() {
                    let label = format!("{}:{}", kind, entity.name);
                    let module = kind.entity_module(entity).unwrap_or_default();
                    let contents =
                        render_one(*kind, &label, registry, Some(entity), &ctx, renderer)?;
                    artifacts.push(Artifact {
                        kind: *kind,
                        label,
                        file_name: format!("{}.rs", module),
                        contents,
                    });
                }
            }
        }
    }

    check_file_names(&artifacts)?;
    debug!(count = artifacts.len(), "rendered artifacts");
    Ok(artifacts)
}

/// Two artifacts mapping to one file would overwrite each other on write.
fn check_file_names(artifacts: &[Artifact]) -> Result<(), SchemaGenError> {
    for (i, artifact) in artifacts.iter().enumerate() {
        if let Some(first) = artifacts[..i].iter().find(|a| a.file_name == artifact.file_name) {
            return Err(SchemaGenError::RenderError {
                artifact: artifact.label.clone(),
                message: format!(
                    "file `{}` already produced by {}",
                    artifact.file_name, first.label
                ),
            });
        }
    }
    Ok(())
}

fn render_one(
    kind: ArtifactKind,
    label: &str,
    registry: &ModelRegistry,
    entity: Option<&EntityMetadata>,
    ctx: &RenderContext<'_>,
    renderer: &dyn TemplateRenderer,
) -> Result<String, SchemaGenError> {
    let payload = TemplatePayload {
        package: ctx.package,
        generated_at: ctx.generated_at,
        registry,
        entity,
        artifacts: ctx.artifacts,
    };

    let rendered = renderer
        .render(kind.template(), &payload)
        .map_err(|e| SchemaGenError::RenderError {
            artifact: label.to_string(),
            message: e.message,
        })?;

    // Custom renderers may omit the marker; cleaning depends on it.
    if rendered.starts_with(GENERATED_MARKER) {
        Ok(rendered)
    } else {
        Ok(format!("{}\n\n{}", GENERATED_MARKER, rendered))
    }
}

/// Write rendered artifacts into `output_dir`, returning the paths written.
pub fn write_artifacts(
    artifacts: &[Artifact],
    output_dir: &Path,
    writer: &dyn FileWriter,
) -> Result<Vec<PathBuf>, SchemaGenError> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = output_dir.join(&artifact.file_name);
        writer
            .write_file(&path, &artifact.contents)
            .map_err(|e| SchemaGenError::WriteError {
                artifact: artifact.label.clone(),
                path: path.clone(),
                source: e,
            })?;
        debug!(artifact = %artifact.label, path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}
