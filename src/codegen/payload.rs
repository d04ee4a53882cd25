//! Data handed to templates

use chrono::{DateTime, SecondsFormat, Utc};

use super::{ArtifactKind, RenderError};
use crate::model::{EntityMetadata, ModelRegistry};
use crate::naming::template_helper;

/// Everything a template can see.
///
/// Per-entity templates get `entity`; model-wide templates get `None` and
/// iterate `registry`. The registry is always present so templates can
/// look up relationship targets.
#[derive(Debug, Clone, Copy)]
pub struct TemplatePayload<'a> {
    /// Target package/module name
    pub package: &'a str,
    pub generated_at: DateTime<Utc>,
    pub registry: &'a ModelRegistry,
    pub entity: Option<&'a EntityMetadata>,
    /// Artifact kinds included in this run
    pub artifacts: &'a [ArtifactKind],
}

impl<'a> TemplatePayload<'a> {
    /// The entity for a per-entity template.
    pub fn entity(&self) -> Result<&'a EntityMetadata, RenderError> {
        self.entity
            .ok_or_else(|| RenderError::new("template expects an entity payload"))
    }

    /// Apply a named case/inflection helper (`snake`, `camel`, `pascal`,
    /// `plural`, `singular`, `table`).
    pub fn helper(&self, name: &str, input: &str) -> Result<String, RenderError> {
        template_helper(name)
            .map(|f| f(input))
            .ok_or_else(|| RenderError::new(format!("unknown template helper `{}`", name)))
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn includes(&self, kind: ArtifactKind) -> bool {
        self.artifacts.contains(&kind)
    }
}
