//! Raw facts extracted from source declarations

use std::path::PathBuf;

/// One named, public field of a record declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFact {
    pub name: String,
    /// Innermost declared type with pointer and collection wrappers removed
    pub type_name: String,
    /// Wrapped in `Option`, `Box`, a reference or another pointer type
    pub is_pointer: bool,
    /// Wrapped in `Vec`, a slice, an array or another collection
    pub is_collection: bool,
    /// `#[db = "..."]`
    pub db_tag: Option<String>,
    /// `#[rel = "..."]`
    pub rel_tag: Option<String>,
    /// `#[display = "..."]`
    pub display_tag: Option<String>,
    pub line: usize,
}

impl FieldFact {
    /// True if the field carries a tag that marks its type as persisted.
    pub fn has_persistence_tag(&self) -> bool {
        self.db_tag.is_some() || self.rel_tag.is_some()
    }
}

/// One record declaration with its table-level tag and fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationFact {
    pub name: String,
    pub source_file: PathBuf,
    pub line: usize,
    /// Struct-level `#[db = "..."]`
    pub table_tag: Option<String>,
    pub fields: Vec<FieldFact>,
}

impl DeclarationFact {
    /// Entities carry a table-level tag or at least one tagged field; anything
    /// else is an ordinary helper type.
    pub fn is_entity(&self) -> bool {
        self.table_tag.is_some() || self.fields.iter().any(FieldFact::has_persistence_tag)
    }
}

/// A file the scanner could not use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Output of a directory scan
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Declarations classified as entities, in file then source order
    pub declarations: Vec<DeclarationFact>,
    /// Record types skipped for carrying no persistence tags
    pub helper_types: Vec<String>,
    /// Files or declarations skipped with a warning
    pub skipped: Vec<ScanFailure>,
    pub files_scanned: usize,
}
