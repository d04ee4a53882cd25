//! Template rendering boundary

use std::fmt;

use thiserror::Error;

use super::TemplatePayload;

/// Named templates, one per artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Columns,
    Repository,
    Query,
    Relations,
    Root,
}

impl TemplateId {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateId::Columns => "columns",
            TemplateId::Repository => "repository",
            TemplateId::Query => "query",
            TemplateId::Relations => "relations",
            TemplateId::Root => "root",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<fmt::Error> for RenderError {
    fn from(_: fmt::Error) -> Self {
        RenderError::new("formatter error while writing template output")
    }
}

/// Turns a validated payload into artifact text. Implementations decide the
/// template technology; the pipeline only sees this trait.
pub trait TemplateRenderer {
    fn render(
        &self,
        template: TemplateId,
        payload: &TemplatePayload<'_>,
    ) -> Result<String, RenderError>;
}
