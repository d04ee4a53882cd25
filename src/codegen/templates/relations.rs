//! `relations.rs`: loader and dependent statements per relationship

use std::fmt::Write;

use super::helpers::{const_name, ident, str_lit};
use crate::codegen::{RenderError, TemplatePayload};
use crate::model::{EntityMetadata, RelationshipField};
use crate::tags::{DependentAction, Relationship};

pub(super) fn write_relations(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    writeln!(
        out,
        "//! Relationship loaders. Every statement takes the owning row's key as `$1`."
    )?;

    for entity in payload.registry.entities_with_relationships() {
        writeln!(out)?;
        writeln!(out, "/// Relationships of `{}` ({})", entity.table_name, entity.name)?;
        writeln!(out, "pub mod {} {{", ident(&payload.helper("snake", &entity.name)?))?;
        for (i, rel) in entity.relationships.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write_relationship(out, payload, entity, rel)?;
        }
        writeln!(out, "}}")?;
    }
    Ok(())
}

fn write_relationship(
    out: &mut String,
    payload: &TemplatePayload<'_>,
    entity: &EntityMetadata,
    rel: &RelationshipField,
) -> Result<(), RenderError> {
    let target = payload
        .registry
        .get(rel.descriptor.target())
        .ok_or_else(|| {
            RenderError::new(format!(
                "{}.{}: relationship target `{}` is not in the model",
                entity.name,
                rel.field_name,
                rel.descriptor.target()
            ))
        })?;
    let table = rel.target_table.as_deref().unwrap_or(&target.table_name);
    let options = &rel.descriptor.options;
    let name = const_name(payload, &rel.field_name)?;

    let mut conditions: Vec<String> = Vec::new();
    let (sql, doc, key_column) = match &rel.descriptor.relation {
        Relationship::BelongsTo {
            foreign_key,
            target_key,
            ..
        } => {
            conditions.push(format!("{} = $1", target_key));
            (
                select(target.column_names(), table, None),
                format!("belongs_to {} via `{}.{}`", target.name, entity.table_name, foreign_key),
                None,
            )
        }
        Relationship::HasOne {
            foreign_key,
            source_key,
            ..
        }
        | Relationship::HasMany {
            foreign_key,
            source_key,
            ..
        } => {
            conditions.push(format!("{} = $1", foreign_key));
            if let Some(poly) = &options.polymorphic {
                conditions.push(format!("{}_type = '{}'", poly, entity.name));
            }
            (
                select(target.column_names(), table, None),
                format!(
                    "{} {} via `{}.{}` (key: `{}`)",
                    rel.descriptor.kind(),
                    target.name,
                    table,
                    foreign_key,
                    source_key
                ),
                Some(foreign_key.as_str()),
            )
        }
        Relationship::ManyToMany {
            join_table,
            join_source_key,
            join_target_key,
            target_key,
            ..
        } => {
            conditions.push(format!("j.{} = $1", join_source_key));
            (
                select(
                    target.column_names(),
                    table,
                    Some(format!(
                        "INNER JOIN {} j ON j.{} = t.{}",
                        join_table, join_target_key, target_key
                    )),
                ),
                format!("many_to_many {} through `{}`", target.name, join_table),
                None,
            )
        }
    };

    if let Some(extra) = &options.conditions {
        conditions.push(format!("({})", extra));
    }

    let mut sql = format!("{} WHERE {}", sql, conditions.join(" AND "));
    if let Some(order) = &options.order_by {
        sql.push_str(&format!(" ORDER BY {}", order));
    }
    if !rel.descriptor.kind().is_to_many() {
        sql.push_str(" LIMIT 1");
    }

    writeln!(out, "    /// {}", doc)?;
    if let Some(through) = &options.through {
        writeln!(out, "    /// Through `{}`", through)?;
    }
    writeln!(out, "    pub const {}: &str = {};", name, str_lit(&sql))?;

    if let Some(action) = options.dependent {
        let dependent = match (&rel.descriptor.relation, key_column) {
            (Relationship::ManyToMany { join_table, join_source_key, .. }, _) => Some((
                "DEPENDENT",
                format!("DELETE FROM {} WHERE {} = $1", join_table, join_source_key),
            )),
            (_, Some(fk)) => Some(dependent_sql(action, table, fk)),
            (_, None) => None,
        };
        if let Some((suffix, sql)) = dependent {
            writeln!(
                out,
                "    /// Run before deleting the owner (dependent: {})",
                action.as_str()
            )?;
            writeln!(out, "    pub const {}_{}: &str = {};", name, suffix, str_lit(&sql))?;
        }
    }
    Ok(())
}

fn select<'a>(columns: impl Iterator<Item = &'a str>, table: &str, join: Option<String>) -> String {
    match join {
        Some(join) => {
            let cols: Vec<String> = columns.map(|c| format!("t.{}", c)).collect();
            format!("SELECT {} FROM {} t {}", cols.join(", "), table, join)
        }
        None => {
            let cols: Vec<&str> = columns.collect();
            format!("SELECT {} FROM {}", cols.join(", "), table)
        }
    }
}

fn dependent_sql(action: DependentAction, table: &str, fk: &str) -> (&'static str, String) {
    match action {
        DependentAction::Destroy | DependentAction::Delete => {
            ("DEPENDENT", format!("DELETE FROM {} WHERE {} = $1", table, fk))
        }
        DependentAction::Nullify => (
            "DEPENDENT",
            format!("UPDATE {} SET {} = NULL WHERE {} = $1", table, fk, fk),
        ),
        DependentAction::Restrict => (
            "DEPENDENT_COUNT",
            format!("SELECT COUNT(*) FROM {} WHERE {} = $1", table, fk),
        ),
    }
}
