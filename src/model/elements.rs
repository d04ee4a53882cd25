//! Entity metadata types

use std::path::PathBuf;

use crate::tags::rules::ForeignKeyRef;
use crate::tags::{AttributeSet, RelationshipDescriptor};

/// One persisted type and its table
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    /// Declared type name (e.g., "User")
    pub name: String,
    /// Table name, explicit or derived (e.g., "users")
    pub table_name: String,
    /// Whether the table name came from a `table:` attribute
    pub table_name_explicit: bool,
    pub source_file: PathBuf,
    /// Plain columns in declaration order
    pub columns: Vec<ColumnField>,
    /// Relationship fields in declaration order
    pub relationships: Vec<RelationshipField>,
    /// Primary key column names in declaration order
    pub primary_keys: Vec<String>,
    pub indexes: Vec<IndexMetadata>,
    pub constraints: Vec<ConstraintMetadata>,
    /// Parsed table-level tag (empty when the type has none)
    pub table_attributes: AttributeSet,
}

impl EntityMetadata {
    /// Find a column by its column name
    pub fn column(&self, column_name: &str) -> Option<&ColumnField> {
        self.columns.iter().find(|c| c.column_name == column_name)
    }

    pub fn has_column(&self, column_name: &str) -> bool {
        self.column(column_name).is_some()
    }

    pub fn has_relationships(&self) -> bool {
        !self.relationships.is_empty()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.column_name.as_str())
    }
}

/// A field mapped to a column
#[derive(Debug, Clone)]
pub struct ColumnField {
    /// Field name as declared (e.g., "created_at")
    pub field_name: String,
    /// Column name, from `column:` or the snake-cased field name
    pub column_name: String,
    /// Declared base type (e.g., "String", "chrono::DateTime")
    pub rust_type: String,
    /// SQL type, from `type:` or inferred from the declared type
    pub sql_type: String,
    /// Whether `sql_type` came from an explicit `type:` attribute
    pub type_override: bool,
    pub is_pointer: bool,
    pub is_collection: bool,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_auto_increment: bool,
    pub default_value: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
    pub comment: Option<String>,
    /// Auxiliary `#[display = "..."]` text
    pub display: Option<String>,
    /// Parsed attribute tag (empty when the field has none)
    pub attributes: AttributeSet,
    pub line: usize,
}

/// A field carrying a relationship tag
#[derive(Debug, Clone)]
pub struct RelationshipField {
    pub field_name: String,
    pub rust_type: String,
    pub is_pointer: bool,
    pub is_collection: bool,
    /// Tag text as written
    pub raw_tag: String,
    pub descriptor: RelationshipDescriptor,
    /// Target table, attached once the target has been resolved
    pub target_table: Option<String>,
    pub display: Option<String>,
    pub line: usize,
}

/// Index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// Named table or column constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMetadata {
    pub name: String,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    Check {
        /// None for table-level checks
        column: Option<String>,
        expression: String,
    },
    ForeignKey {
        column: String,
        references: ForeignKeyRef,
    },
    Enum {
        column: String,
        values: Vec<String>,
    },
}
