//! Validation report: collected errors and warnings

use std::fmt;

/// One problem, located by entity and (optionally) field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub entity: String,
    /// Field name, empty for entity- or model-level issues
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}: {}", self.entity, self.message)
        } else {
            write!(f, "{}.{}: {}", self.entity, self.field, self.message)
        }
    }
}

/// Outcome of validating a whole model
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems that make the run invalid, in discovery order
    pub errors: Vec<ValidationIssue>,
    /// Accepted but suspicious input
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, entity: &str, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn warning(&mut self, entity: &str, field: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Human-readable lines, errors first
    pub fn lines(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|issue| format!("error: {}", issue))
            .chain(self.warnings.iter().map(|issue| format!("warning: {}", issue)))
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        if self.is_valid() {
            write!(f, "validation passed ({} warning(s))", self.warnings.len())
        } else {
            write!(
                f,
                "validation failed: {} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}
