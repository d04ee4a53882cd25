//! Built-in templates emitting Rust source

mod columns;
mod helpers;
mod query;
mod relations;
mod repository;
mod root;

use super::{RenderError, TemplateId, TemplatePayload, TemplateRenderer};

/// Default renderer: plain Rust modules of `&'static str` SQL and column
/// descriptors, with no runtime dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTemplates;

impl TemplateRenderer for RustTemplates {
    fn render(
        &self,
        template: TemplateId,
        payload: &TemplatePayload<'_>,
    ) -> Result<String, RenderError> {
        let mut out = String::with_capacity(4096);
        helpers::write_header(&mut out, payload)?;
        match template {
            TemplateId::Columns => columns::write_columns(&mut out, payload)?,
            TemplateId::Repository => repository::write_repository(&mut out, payload)?,
            TemplateId::Query => query::write_query(&mut out, payload)?,
            TemplateId::Relations => relations::write_relations(&mut out, payload)?,
            TemplateId::Root => root::write_root(&mut out, payload)?,
        }
        Ok(out)
    }
}
