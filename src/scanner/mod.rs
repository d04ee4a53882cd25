//! Declaration scanning

mod facts;
mod source_scanner;
mod type_expr;

pub use facts::{DeclarationFact, FieldFact, ScanFailure, ScanResult};
pub use source_scanner::{
    is_test_file, scan_directory, scan_source, ScanOptions, DB_ATTR, DISPLAY_ATTR, REL_ATTR,
};
pub use type_expr::{resolve_type, ResolvedType};
