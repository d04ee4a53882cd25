//! Build entity metadata from scanned declarations and parsed tags

use anyhow::Result;
use tracing::debug;

use crate::error::SchemaGenError;
use crate::naming::{derive_table_name, to_snake_case};
use crate::scanner::{DeclarationFact, FieldFact};
use crate::tags::rules::{parse_enum_values, parse_foreign_key, parse_index_spec};
use crate::tags::{AttributeSet, TagParser};

use super::{
    ColumnField, ConstraintKind, ConstraintMetadata, EntityMetadata, IndexMetadata,
    ModelRegistry, RelationshipField,
};

/// Build a fresh registry from entity declarations.
///
/// A relationship tag that fails to parse aborts the build with the entity,
/// field and raw tag in the error.
pub fn build_model(
    declarations: &[DeclarationFact],
    parser: &mut TagParser,
) -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for decl in declarations {
        let entity = build_entity(decl, parser)?;
        debug!(
            entity = %entity.name,
            table = %entity.table_name,
            columns = entity.columns.len(),
            relationships = entity.relationships.len(),
            "built entity"
        );
        registry.insert(entity)?;
    }
    Ok(registry)
}

/// Build one entity.
pub fn build_entity(
    decl: &DeclarationFact,
    parser: &mut TagParser,
) -> Result<EntityMetadata, SchemaGenError> {
    let table_attributes = decl
        .table_tag
        .as_deref()
        .map(|raw| parser.parse_attributes(raw))
        .unwrap_or_default();

    let explicit_table = table_attributes.value("table").map(str::to_string);
    let table_name_explicit = explicit_table.is_some();
    let table_name = explicit_table.unwrap_or_else(|| derive_table_name(&decl.name));

    let mut entity = EntityMetadata {
        name: decl.name.clone(),
        table_name,
        table_name_explicit,
        source_file: decl.source_file.clone(),
        columns: Vec::new(),
        relationships: Vec::new(),
        primary_keys: Vec::new(),
        indexes: Vec::new(),
        constraints: Vec::new(),
        table_attributes,
    };

    for field in &decl.fields {
        if let Some(raw) = &field.rel_tag {
            let descriptor =
                parser
                    .parse_relationship(raw)
                    .map_err(|source| SchemaGenError::TagParseError {
                        entity: decl.name.clone(),
                        field: field.name.clone(),
                        tag: raw.clone(),
                        source,
                    })?;
            entity.relationships.push(RelationshipField {
                field_name: field.name.clone(),
                rust_type: field.type_name.clone(),
                is_pointer: field.is_pointer,
                is_collection: field.is_collection,
                raw_tag: raw.clone(),
                descriptor,
                target_table: None,
                display: field.display_tag.clone(),
                line: field.line,
            });
            continue;
        }

        let attributes = field
            .db_tag
            .as_deref()
            .map(|raw| parser.parse_attributes(raw))
            .unwrap_or_default();
        if attributes.has("-") {
            debug!(entity = %decl.name, field = %field.name, "field ignored");
            continue;
        }

        let column = build_column(field, attributes);
        if column.is_primary_key {
            entity.primary_keys.push(column.column_name.clone());
        }
        add_column_indexes(&mut entity, &column);
        add_column_constraints(&mut entity, &column);
        entity.columns.push(column);
    }

    add_table_level_metadata(&mut entity);

    Ok(entity)
}

fn build_column(field: &FieldFact, attributes: AttributeSet) -> ColumnField {
    let column_name = attributes
        .value("column")
        .map(str::to_string)
        .unwrap_or_else(|| to_snake_case(&field.name));
    let is_primary_key = attributes.has("primary_key");

    let type_override = attributes.value("type").map(str::to_string);
    let sql_type = match &type_override {
        Some(ty) => ty.clone(),
        None if attributes.has("enum") => "text".to_string(),
        None => infer_sql_type(
            &field.type_name,
            field.is_collection,
            attributes.value("size").and_then(|s| s.parse().ok()),
        ),
    };

    let is_nullable = attributes.has("null")
        || (field.is_pointer && !attributes.has("not_null") && !is_primary_key);
    let foreign_key = attributes
        .values("foreign_key")
        .next()
        .and_then(|v| parse_foreign_key(v).ok());

    ColumnField {
        field_name: field.name.clone(),
        column_name,
        rust_type: field.type_name.clone(),
        sql_type,
        type_override: type_override.is_some(),
        is_pointer: field.is_pointer,
        is_collection: field.is_collection,
        is_nullable,
        is_primary_key,
        is_unique: attributes.has("unique"),
        is_auto_increment: attributes.has("auto_increment"),
        default_value: attributes.value("default").map(str::to_string),
        foreign_key,
        comment: attributes.value("comment").map(str::to_string),
        display: field.display_tag.clone(),
        attributes,
        line: field.line,
    }
}

/// Map a declared base type to a column type.
pub fn infer_sql_type(rust_type: &str, is_collection: bool, size: Option<u32>) -> String {
    let last = rust_type.rsplit("::").next().unwrap_or(rust_type);

    if is_collection {
        return match last {
            "u8" => "bytea".to_string(),
            _ => "jsonb".to_string(),
        };
    }

    match last {
        "i8" | "i16" | "u8" => "smallint".to_string(),
        "i32" | "u16" => "integer".to_string(),
        "i64" | "u32" | "u64" | "isize" | "usize" => "bigint".to_string(),
        "f32" => "real".to_string(),
        "f64" => "double precision".to_string(),
        "bool" => "boolean".to_string(),
        "char" => "char(1)".to_string(),
        "String" | "str" => match size {
            Some(n) if n > 0 => format!("varchar({})", n),
            _ => "text".to_string(),
        },
        "Uuid" => "uuid".to_string(),
        "NaiveDate" | "Date" => "date".to_string(),
        "NaiveTime" | "Time" => "time".to_string(),
        "DateTime" | "OffsetDateTime" => "timestamptz".to_string(),
        "NaiveDateTime" | "PrimitiveDateTime" | "SystemTime" => "timestamp".to_string(),
        "Decimal" | "BigDecimal" => "numeric".to_string(),
        "Value" | "Json" | "JsonValue" => "jsonb".to_string(),
        _ => "text".to_string(),
    }
}

fn add_column_indexes(entity: &mut EntityMetadata, column: &ColumnField) {
    for (key, is_unique, prefix) in [("index", false, "idx"), ("unique_index", true, "uq")] {
        if !column.attributes.has(key) {
            continue;
        }
        let mut names: Vec<String> = column.attributes.values(key).map(str::to_string).collect();
        if names.is_empty() {
            names.push(format!("{}_{}_{}", prefix, entity.table_name, column.column_name));
        }
        for name in names {
            push_index_column(entity, name, &column.column_name, is_unique);
        }
    }
}

/// Indexes sharing a name across fields form one composite index.
fn push_index_column(entity: &mut EntityMetadata, name: String, column: &str, is_unique: bool) {
    match entity
        .indexes
        .iter_mut()
        .find(|idx| idx.name == name && idx.is_unique == is_unique)
    {
        Some(idx) => {
            if !idx.columns.iter().any(|c| c == column) {
                idx.columns.push(column.to_string());
            }
        }
        None => entity.indexes.push(IndexMetadata {
            name,
            columns: vec![column.to_string()],
            is_unique,
        }),
    }
}

fn add_column_constraints(entity: &mut EntityMetadata, column: &ColumnField) {
    let base = format!("{}_{}", entity.table_name, column.column_name);

    for (i, expression) in column.attributes.values("check").enumerate() {
        entity.constraints.push(ConstraintMetadata {
            name: numbered(&format!("chk_{}", base), i),
            kind: ConstraintKind::Check {
                column: Some(column.column_name.clone()),
                expression: expression.to_string(),
            },
        });
    }

    if let Some(references) = &column.foreign_key {
        entity.constraints.push(ConstraintMetadata {
            name: format!("fk_{}", base),
            kind: ConstraintKind::ForeignKey {
                column: column.column_name.clone(),
                references: references.clone(),
            },
        });
    }

    if let Some(Ok(values)) = column.attributes.value("enum").map(parse_enum_values) {
        entity.constraints.push(ConstraintMetadata {
            name: format!("enum_{}", base),
            kind: ConstraintKind::Enum {
                column: column.column_name.clone(),
                values,
            },
        });
    }
}

fn add_table_level_metadata(entity: &mut EntityMetadata) {
    let attrs = entity.table_attributes.clone();

    for (key, is_unique, prefix) in [("index", false, "idx"), ("unique_index", true, "uq")] {
        for spec in attrs.values(key).filter_map(|v| parse_index_spec(v).ok()) {
            let name = spec.name.unwrap_or_else(|| {
                format!("{}_{}_{}", prefix, entity.table_name, spec.columns.join("_"))
            });
            entity.indexes.push(IndexMetadata {
                name,
                columns: spec.columns,
                is_unique,
            });
        }
    }

    for (i, expression) in attrs.values("check").enumerate() {
        entity.constraints.push(ConstraintMetadata {
            name: numbered(&format!("chk_{}", entity.table_name), i),
            kind: ConstraintKind::Check {
                column: None,
                expression: expression.to_string(),
            },
        });
    }
}

fn numbered(base: &str, i: usize) -> String {
    if i == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, i + 1)
    }
}
