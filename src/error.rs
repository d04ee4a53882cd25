//! Error types for schemagen

use std::path::PathBuf;
use thiserror::Error;

use crate::tags::TagParseError;
use crate::validate::ValidationReport;

/// Errors that can occur while compiling tagged declarations
#[derive(Error, Debug)]
pub enum SchemaGenError {
    #[error("Failed to read input directory: {path}")]
    InputDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read source file: {path}")]
    SourceReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source parse error in {path} at line {line}: {message}")]
    SourceParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidExcludePattern { pattern: String, message: String },

    #[error("Invalid tag on {entity}.{field} (`{tag}`): {source}")]
    TagParseError {
        entity: String,
        field: String,
        tag: String,
        #[source]
        source: TagParseError,
    },

    #[error("Entity {name} is declared in both {first} and {second}")]
    DuplicateEntity {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Schema validation failed with {} error(s)", report.errors.len())]
    ValidationFailed { report: ValidationReport },

    #[error("Failed to render artifact {artifact}: {message}")]
    RenderError { artifact: String, message: String },

    #[error("Failed to write artifact {artifact} to {path}")]
    WriteError {
        artifact: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clean generated file {path}")]
    CleanError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
