//! `<entity>_repository.rs`: CRUD statements for one table

use std::fmt::Write;

use super::helpers::{column_list, const_name, placeholders_eq, str_lit, str_slice};
use crate::codegen::{RenderError, TemplatePayload};
use crate::model::EntityMetadata;

pub(super) fn write_repository(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    let entity = payload.entity()?;
    let type_name = format!("{}Repository", payload.helper("pascal", &entity.name)?);
    let columns = column_list(entity);
    let table = &entity.table_name;

    writeln!(out, "//! Repository SQL for `{}` ({}).", table, entity.name)?;
    writeln!(out)?;
    writeln!(
        out,
        "/// CRUD statements for `{}` rows. Placeholders are positional (`$1`, `$2`, ...).",
        table
    )?;
    writeln!(out, "#[derive(Debug, Clone, Copy, Default)]")?;
    writeln!(out, "pub struct {};", type_name)?;
    writeln!(out)?;
    writeln!(out, "impl {} {{", type_name)?;
    writeln!(out, "    pub const TABLE: &'static str = {};", str_lit(table))?;
    writeln!(
        out,
        "    pub const COLUMNS: &'static [&'static str] = {};",
        str_slice(entity.column_names())
    )?;
    writeln!(out)?;

    write_statement(out, "SELECT_ALL", &format!("SELECT {} FROM {}", columns, table))?;
    write_statement(out, "COUNT", &format!("SELECT COUNT(*) FROM {}", table))?;
    write_statement(out, "INSERT", &insert_sql(entity))?;

    let pks: Vec<&str> = entity.primary_keys.iter().map(String::as_str).collect();
    if !pks.is_empty() {
        let pk_where = placeholders_eq(&pks, 1, " AND ");
        write_statement(
            out,
            "FIND_BY_PK",
            &format!("SELECT {} FROM {} WHERE {}", columns, table, pk_where),
        )?;

        let settable: Vec<&str> = entity
            .columns
            .iter()
            .filter(|c| !c.is_primary_key)
            .map(|c| c.column_name.as_str())
            .collect();
        if !settable.is_empty() {
            let set = placeholders_eq(&settable, 1, ", ");
            let key = placeholders_eq(&pks, settable.len() + 1, " AND ");
            write_statement(
                out,
                "UPDATE",
                &format!("UPDATE {} SET {} WHERE {}", table, set, key),
            )?;
        }

        write_statement(out, "DELETE", &format!("DELETE FROM {} WHERE {}", table, pk_where))?;
    }

    for column in entity.columns.iter().filter(|c| c.is_unique && !c.is_primary_key) {
        let name = format!("FIND_BY_{}", const_name(payload, &column.column_name)?);
        write_statement(
            out,
            &name,
            &format!("SELECT {} FROM {} WHERE {} = $1", columns, table, column.column_name),
        )?;
    }

    writeln!(out, "}}")?;
    Ok(())
}

fn write_statement(out: &mut String, name: &str, sql: &str) -> Result<(), RenderError> {
    writeln!(out, "    pub const {}: &'static str = {};", name, str_lit(sql))?;
    Ok(())
}

/// Auto-increment columns are left to the database and read back.
fn insert_sql(entity: &EntityMetadata) -> String {
    let insertable: Vec<&str> = entity
        .columns
        .iter()
        .filter(|c| !c.is_auto_increment)
        .map(|c| c.column_name.as_str())
        .collect();
    let returning = column_list(entity);

    if insertable.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            entity.table_name, returning
        );
    }

    let values: Vec<String> = (1..=insertable.len()).map(|n| format!("${}", n)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        entity.table_name,
        insertable.join(", "),
        values.join(", "),
        returning
    )
}
