//! Structural and referential validation of the whole model

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ValidationReport;
use crate::model::{EntityMetadata, ModelRegistry, RelationshipField};
use crate::naming::to_snake_case;
use crate::tags::rules::{
    check_column_attributes, check_table_attributes, parse_index_spec, Severity, TagDiagnostic,
};
use crate::tags::{RelationKind, Relationship};

static TABLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)*$").unwrap());

/// Validate every entity, then the model as a whole. Never stops at the first
/// problem: all errors land in the report.
pub fn validate_model(registry: &ModelRegistry) -> ValidationReport {
    let mut report = ValidationReport::new();

    for entity in registry.iter() {
        validate_entity(entity, registry, &mut report);
    }
    validate_tables(registry, &mut report);

    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation complete"
    );
    report
}

/// Lower-case, underscore-delimited, no leading, trailing or double underscores.
pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME_RE.is_match(name)
}

fn validate_entity(
    entity: &EntityMetadata,
    registry: &ModelRegistry,
    report: &mut ValidationReport,
) {
    if entity.primary_keys.is_empty() {
        report.error(&entity.name, "", "no primary key defined");
    }

    record(report, &entity.name, "", check_table_attributes(&entity.table_attributes));

    for key in ["index", "unique_index"] {
        for spec in entity
            .table_attributes
            .values(key)
            .filter_map(|v| parse_index_spec(v).ok())
        {
            for column in spec.columns.iter().filter(|c| !entity.has_column(c)) {
                report.error(
                    &entity.name,
                    "",
                    format!("{} references unknown column `{}`", key, column),
                );
            }
        }
    }

    let mut seen = HashSet::new();
    for column in &entity.columns {
        if !seen.insert(column.column_name.as_str()) {
            report.error(
                &entity.name,
                &column.field_name,
                format!("duplicate column name `{}`", column.column_name),
            );
        }

        record(
            report,
            &entity.name,
            &column.field_name,
            check_column_attributes(&column.attributes),
        );

        if let Some(fk) = &column.foreign_key {
            let mut targets = registry.find_by_table(&fk.table).peekable();
            if targets.peek().is_none() {
                report.warning(
                    &entity.name,
                    &column.field_name,
                    format!("foreign key references table `{}` outside the model", fk.table),
                );
            } else if !targets.any(|t| t.has_column(&fk.column)) {
                report.error(
                    &entity.name,
                    &column.field_name,
                    format!("foreign key references unknown column `{}.{}`", fk.table, fk.column),
                );
            }
        }
    }

    for rel in &entity.relationships {
        validate_relationship(entity, rel, registry, report);
    }
}

fn record(
    report: &mut ValidationReport,
    entity: &str,
    field: &str,
    diagnostics: Vec<TagDiagnostic>,
) {
    for d in diagnostics {
        match d.severity {
            Severity::Error => report.error(entity, field, d.message),
            Severity::Warning => report.warning(entity, field, d.message),
        }
    }
}

fn validate_relationship(
    entity: &EntityMetadata,
    rel: &RelationshipField,
    registry: &ModelRegistry,
    report: &mut ValidationReport,
) {
    let target_name = rel.descriptor.target();
    let Some(target) = registry.get(target_name) else {
        report.error(
            &entity.name,
            &rel.field_name,
            format!("relationship target `{}` not found", target_name),
        );
        return;
    };

    let mut require = |owner: &EntityMetadata, column: &str, role: &str| {
        if !owner.has_column(column) {
            report.error(
                &entity.name,
                &rel.field_name,
                format!("{} column `{}` not found on {}", role, column, owner.name),
            );
        }
    };

    match &rel.descriptor.relation {
        Relationship::BelongsTo {
            foreign_key,
            target_key,
            ..
        } => {
            require(entity, foreign_key.as_str(), "foreign key");
            require(target, target_key.as_str(), "target key");
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
            require(target, foreign_key.as_str(), "foreign key");
            require(entity, source_key.as_str(), "source key");
        }
        Relationship::ManyToMany { join_table, .. } => {
            // Join table columns are not verified; only the target is resolved.
            debug!(
                entity = %entity.name,
                field = %rel.field_name,
                join_table = %join_table,
                "join table structure not verified"
            );
        }
    }

    let kind = rel.descriptor.kind();
    if kind.is_to_many() && !rel.is_collection {
        report.warning(
            &entity.name,
            &rel.field_name,
            format!("{} field is not a collection", kind),
        );
    } else if !kind.is_to_many() && rel.is_collection {
        report.warning(
            &entity.name,
            &rel.field_name,
            format!("{} field is a collection", kind),
        );
    }

    let declared = rel.rust_type.rsplit("::").next().unwrap_or(&rel.rust_type);
    if kind != RelationKind::ManyToMany && declared != target_name {
        report.warning(
            &entity.name,
            &rel.field_name,
            format!(
                "field type `{}` differs from relationship target `{}`",
                rel.rust_type, target_name
            ),
        );
    }
}

fn validate_tables(registry: &ModelRegistry, report: &mut ValidationReport) {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for entity in registry.iter() {
        match groups.iter_mut().find(|(table, _)| *table == entity.table_name) {
            Some((_, names)) => names.push(entity.name.as_str()),
            None => groups.push((entity.table_name.as_str(), vec![entity.name.as_str()])),
        }
    }
    for (table, names) in groups.iter().filter(|(_, names)| names.len() > 1) {
        report.error(
            names[0],
            "",
            format!("duplicate table name `{}` declared by {}", table, names.join(", ")),
        );
    }

    let mut modules: Vec<(String, Vec<&str>)> = Vec::new();
    for entity in registry.iter() {
        let module = to_snake_case(&entity.name);
        match modules.iter_mut().find(|(m, _)| *m == module) {
            Some((_, names)) => names.push(entity.name.as_str()),
            None => modules.push((module, vec![entity.name.as_str()])),
        }
    }
    for (module, names) in modules.iter().filter(|(_, names)| names.len() > 1) {
        report.error(
            names[0],
            "",
            format!("duplicate module name `{}` derived from {}", module, names.join(", ")),
        );
    }

    for entity in registry.iter().filter(|e| !is_valid_table_name(&e.table_name)) {
        let message = if entity.table_name_explicit {
            format!(
                "invalid table name `{}`: use lower-case words joined by single underscores",
                entity.table_name
            )
        } else {
            format!(
                "invalid table name `{}` derived from `{}`: declare one with `table:`",
                entity.table_name, entity.name
            )
        };
        report.error(&entity.name, "", message);
    }
}
