//! Schema and relationship validation

mod report;
mod schema_validator;

pub use report::{ValidationIssue, ValidationReport};
pub use schema_validator::{is_valid_table_name, validate_model};
