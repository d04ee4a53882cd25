//! `mod.rs`: declares the generated modules

use std::fmt::Write;

use super::helpers::str_lit;
use crate::codegen::{ArtifactKind, RenderError, TemplatePayload};

pub(super) fn write_root(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    writeln!(out, "//! Generated data-access code for package `{}`.", payload.package)?;
    writeln!(out)?;

    let mut modules: Vec<String> = Vec::new();
    for kind in payload.artifacts.iter().filter(|k| **k != ArtifactKind::Root) {
        match kind.model_module() {
            Some(module) => modules.push(module.to_string()),
            None => modules.extend(payload.registry.iter().filter_map(|e| kind.entity_module(e))),
        }
    }
    modules.sort();

    for module in &modules {
        writeln!(out, "pub mod {};", module)?;
    }
    if !modules.is_empty() {
        writeln!(out)?;
    }

    writeln!(out, "/// Every entity in the model as `(type name, table name)`.")?;
    writeln!(out, "pub const ENTITIES: &[(&str, &str)] = &[")?;
    for entity in payload.registry.iter() {
        writeln!(
            out,
            "    ({}, {}),",
            str_lit(&entity.name),
            str_lit(&entity.table_name)
        )?;
    }
    writeln!(out, "];")?;
    Ok(())
}
