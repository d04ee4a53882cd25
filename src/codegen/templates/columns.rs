//! `columns.rs`: per-entity column descriptors

use std::fmt::Write;

use super::helpers::{const_name, ident, opt_str_lit, str_lit, str_slice};
use crate::codegen::{RenderError, TemplatePayload};
use crate::model::{ConstraintKind, EntityMetadata};

/// Names the entity module already uses for its own constants
const RESERVED: &[&str] = &["TABLE", "ALL", "PRIMARY_KEY", "COLUMNS", "INDEXES", "CHECKS"];

pub(super) fn write_columns(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    writeln!(out, "//! Column descriptors for every entity.")?;
    writeln!(out)?;
    writeln!(out, "/// Static description of one column.")?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
    writeln!(out, "pub struct Column {{")?;
    writeln!(out, "    pub name: &'static str,")?;
    writeln!(out, "    pub sql_type: &'static str,")?;
    writeln!(out, "    pub nullable: bool,")?;
    writeln!(out, "    pub primary_key: bool,")?;
    writeln!(out, "    pub unique: bool,")?;
    writeln!(out, "    pub auto_increment: bool,")?;
    writeln!(out, "    pub default: Option<&'static str>,")?;
    writeln!(out, "    /// `table.column` this column references")?;
    writeln!(out, "    pub references: Option<&'static str>,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Static description of one index.")?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
    writeln!(out, "pub struct Index {{")?;
    writeln!(out, "    pub name: &'static str,")?;
    writeln!(out, "    pub columns: &'static [&'static str],")?;
    writeln!(out, "    pub unique: bool,")?;
    writeln!(out, "}}")?;

    for entity in payload.registry.iter() {
        writeln!(out)?;
        write_entity_module(out, payload, entity)?;
    }
    Ok(())
}

fn write_entity_module(
    out: &mut String,
    payload: &TemplatePayload<'_>,
    entity: &EntityMetadata,
) -> Result<(), RenderError> {
    let module = ident(&payload.helper("snake", &entity.name)?);

    writeln!(out, "/// `{}` ({})", entity.table_name, entity.name)?;
    writeln!(out, "pub mod {} {{", module)?;
    writeln!(out, "    use super::{{Column, Index}};")?;
    writeln!(out)?;
    writeln!(out, "    pub const TABLE: &str = {};", str_lit(&entity.table_name))?;

    for column in &entity.columns {
        let mut name = const_name(payload, &column.column_name)?;
        if RESERVED.contains(&name.as_str()) {
            name.push_str("_COLUMN");
        }
        if let Some(comment) = &column.comment {
            writeln!(out, "    /// {}", comment)?;
        }
        writeln!(out, "    pub const {}: &str = {};", name, str_lit(&column.column_name))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "    pub const PRIMARY_KEY: &[&str] = {};",
        str_slice(entity.primary_keys.iter().map(String::as_str))
    )?;
    writeln!(out, "    pub const ALL: &[&str] = {};", str_slice(entity.column_names()))?;
    writeln!(out)?;

    writeln!(out, "    pub const COLUMNS: &[Column] = &[")?;
    for column in &entity.columns {
        let references = column
            .foreign_key
            .as_ref()
            .map(|fk| format!("{}.{}", fk.table, fk.column));
        writeln!(out, "        Column {{")?;
        writeln!(out, "            name: {},", str_lit(&column.column_name))?;
        writeln!(out, "            sql_type: {},", str_lit(&column.sql_type))?;
        writeln!(out, "            nullable: {},", column.is_nullable)?;
        writeln!(out, "            primary_key: {},", column.is_primary_key)?;
        writeln!(out, "            unique: {},", column.is_unique)?;
        writeln!(out, "            auto_increment: {},", column.is_auto_increment)?;
        writeln!(out, "            default: {},", opt_str_lit(column.default_value.as_deref()))?;
        writeln!(out, "            references: {},", opt_str_lit(references.as_deref()))?;
        writeln!(out, "        }},")?;
    }
    writeln!(out, "    ];")?;
    writeln!(out)?;

    writeln!(out, "    pub const INDEXES: &[Index] = &[")?;
    for index in &entity.indexes {
        writeln!(
            out,
            "        Index {{ name: {}, columns: {}, unique: {} }},",
            str_lit(&index.name),
            str_slice(index.columns.iter().map(String::as_str)),
            index.is_unique
        )?;
    }
    writeln!(out, "    ];")?;

    let checks: Vec<&str> = entity
        .constraints
        .iter()
        .filter_map(|c| match &c.kind {
            ConstraintKind::Check { expression, .. } => Some(expression.as_str()),
            _ => None,
        })
        .collect();
    writeln!(out)?;
    writeln!(out, "    pub const CHECKS: &[&str] = {};", str_slice(checks))?;

    for constraint in &entity.constraints {
        if let ConstraintKind::Enum { column, values } = &constraint.kind {
            writeln!(out)?;
            writeln!(out, "    /// Allowed values of `{}`", column)?;
            writeln!(
                out,
                "    pub const {}_VALUES: &[&str] = {};",
                const_name(payload, column)?,
                str_slice(values.iter().map(String::as_str))
            )?;
        }
    }

    writeln!(out, "}}")?;
    Ok(())
}
