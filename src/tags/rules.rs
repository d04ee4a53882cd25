//! Semantic rules for attribute tags
//!
//! Parsing accepts any attribute text. These checks decide which values are
//! errors and which only deserve a warning. Unknown keys are warnings so new
//! keys can be introduced without breaking older declarations.

use std::sync::LazyLock;

use regex::Regex;

use super::AttributeSet;
use crate::util::{contains_ci, find_keyword_ci};

/// Keys understood on a field's attribute tag
pub const COLUMN_KEYS: &[&str] = &[
    "-",
    "primary_key",
    "column",
    "type",
    "unique",
    "not_null",
    "null",
    "default",
    "auto_increment",
    "index",
    "unique_index",
    "foreign_key",
    "check",
    "enum",
    "size",
    "comment",
];

/// Keys understood on a table-level tag
pub const TABLE_KEYS: &[&str] = &["table", "index", "unique_index", "check", "comment"];

const FLAG_KEYS: &[&str] = &["primary_key", "unique", "not_null", "null", "auto_increment"];

/// Column type names accepted by `type:`; parameterized forms match on the
/// text before `(`.
const BASE_TYPES: &[&str] = &[
    "smallint",
    "integer",
    "int",
    "int2",
    "int4",
    "int8",
    "bigint",
    "tinyint",
    "mediumint",
    "serial",
    "smallserial",
    "bigserial",
    "real",
    "float",
    "float4",
    "float8",
    "double",
    "double precision",
    "decimal",
    "numeric",
    "money",
    "boolean",
    "bool",
    "bit",
    "char",
    "character",
    "varchar",
    "character varying",
    "nchar",
    "nvarchar",
    "text",
    "tinytext",
    "mediumtext",
    "longtext",
    "citext",
    "blob",
    "longblob",
    "bytea",
    "binary",
    "varbinary",
    "date",
    "time",
    "timetz",
    "datetime",
    "timestamp",
    "timestamptz",
    "timestamp with time zone",
    "timestamp without time zone",
    "interval",
    "year",
    "json",
    "jsonb",
    "uuid",
    "enum",
    "inet",
    "cidr",
    "macaddr",
    "xml",
];

const DEFAULT_KEYWORDS: &[&str] = &[
    "true",
    "false",
    "null",
    "current_timestamp",
    "current_date",
    "current_time",
    "localtimestamp",
    "localtime",
];

const LENGTH_FUNCTIONS: &[&str] = &[
    "length(",
    "char_length(",
    "character_length(",
    "octet_length(",
    "len(",
];

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").unwrap());
static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'(?:[^']|'')*'$").unwrap());
static CAST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^'(?:[^']|'')*'::[A-Za-z_][A-Za-z0-9_ ]*(\(\d+(,\s*\d+)?\))?$").unwrap()
});
static FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*\s*\(.*\)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding about one attribute key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDiagnostic {
    pub severity: Severity,
    pub key: String,
    pub message: String,
}

impl TagDiagnostic {
    fn error(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            key: key.to_string(),
            message: message.into(),
        }
    }

    fn warning(key: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// `table.column` reference from a `foreign_key:` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// `name(col_a,col_b)` index declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Check every key of a field-level attribute tag.
pub fn check_column_attributes(attrs: &AttributeSet) -> Vec<TagDiagnostic> {
    let mut out = Vec::new();

    for (key, value) in attrs.iter() {
        match key {
            "-" => {}
            k if FLAG_KEYS.contains(&k) => {
                if !value.is_empty() {
                    out.push(TagDiagnostic::warning(
                        key,
                        format!("`{}` is a flag; value `{}` is ignored", key, value),
                    ));
                }
            }
            "column" => {
                if !is_valid_identifier(value) {
                    out.push(TagDiagnostic::error(
                        key,
                        format!("invalid column name `{}`", value),
                    ));
                }
            }
            "type" => {
                if let Err(message) = validate_column_type(value) {
                    out.push(TagDiagnostic::error(key, message));
                }
            }
            "default" => {
                if let Some(message) = check_default_value(value) {
                    out.push(TagDiagnostic::warning(key, message));
                }
            }
            "foreign_key" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
                for reference in attrs.values(key) {
                    if let Err(message) = parse_foreign_key(reference) {
                        out.push(TagDiagnostic::error(key, message));
                    }
                }
            }
            "check" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
                for expr in attrs.values(key) {
                    if let Err(message) = validate_check_constraint(expr) {
                        out.push(TagDiagnostic::error(key, message));
                    }
                }
            }
            "enum" => {
                if let Err(message) = parse_enum_values(value) {
                    out.push(TagDiagnostic::error(key, message));
                }
            }
            "size" => match value.parse::<u32>() {
                Ok(n) if n > 0 => {}
                _ => out.push(TagDiagnostic::error(
                    key,
                    format!("size must be a positive integer, got `{}`", value),
                )),
            },
            "comment" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
            }
            "index" | "unique_index" => {
                for name in attrs.values(key) {
                    if !is_valid_identifier(name) {
                        out.push(TagDiagnostic::error(
                            key,
                            format!("invalid index name `{}`", name),
                        ));
                    }
                }
            }
            _ => out.push(TagDiagnostic::warning(
                key,
                format!("unknown attribute `{}`", key),
            )),
        }
    }

    if attrs.has("null") && attrs.has("not_null") {
        out.push(TagDiagnostic::error(
            "null",
            "`null` and `not_null` are mutually exclusive",
        ));
    }
    if attrs.has("primary_key") && attrs.has("null") {
        out.push(TagDiagnostic::error(
            "primary_key",
            "a primary key column cannot be nullable",
        ));
    }

    out
}

/// Check every key of a table-level tag. Table-name shape is checked across
/// the whole model, not here.
pub fn check_table_attributes(attrs: &AttributeSet) -> Vec<TagDiagnostic> {
    let mut out = Vec::new();

    for (key, value) in attrs.iter() {
        match key {
            "table" | "comment" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
            }
            "index" | "unique_index" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
                for spec in attrs.values(key) {
                    if let Err(message) = parse_index_spec(spec) {
                        out.push(TagDiagnostic::error(key, message));
                    }
                }
            }
            "check" => {
                if value.is_empty() {
                    out.push(requires_value(key));
                }
                for expr in attrs.values(key) {
                    if let Err(message) = validate_check_constraint(expr) {
                        out.push(TagDiagnostic::error(key, message));
                    }
                }
            }
            _ => out.push(TagDiagnostic::warning(
                key,
                format!("unknown table attribute `{}`", key),
            )),
        }
    }

    out
}

fn requires_value(key: &str) -> TagDiagnostic {
    TagDiagnostic::error(key, format!("`{}` requires a value", key))
}

/// Accept a declared column type from the allow-list, with an optional
/// parameter list, `[]` array suffix or trailing `unsigned`.
pub fn validate_column_type(ty: &str) -> Result<(), String> {
    let lowered = ty.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err("column type is empty".to_string());
    }

    let mut t = lowered.as_str();
    t = t.strip_suffix("[]").unwrap_or(t).trim_end();
    t = t.strip_suffix("unsigned").unwrap_or(t).trim_end();

    let base = match t.find('(') {
        Some(pos) => {
            if !t.ends_with(')') {
                return Err(format!("unterminated parameter list in type `{}`", ty));
            }
            if t[pos + 1..t.len() - 1].trim().is_empty() {
                return Err(format!("empty parameter list in type `{}`", ty));
            }
            t[..pos].trim()
        }
        None => t,
    };

    if BASE_TYPES.contains(&base) {
        Ok(())
    } else {
        Err(format!("unsupported column type `{}`", ty))
    }
}

/// Returns a warning message when a default expression is not a recognized
/// literal or function form. Unrecognized defaults are still accepted.
pub fn check_default_value(expr: &str) -> Option<String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Some("`default` has no value".to_string());
    }

    let recognized = NUMERIC_RE.is_match(expr)
        || QUOTED_RE.is_match(expr)
        || CAST_RE.is_match(expr)
        || FUNCTION_RE.is_match(expr)
        || DEFAULT_KEYWORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(expr));

    if recognized {
        None
    } else {
        Some(format!(
            "unrecognized default expression `{}` is passed through verbatim",
            expr
        ))
    }
}

pub fn parse_foreign_key(value: &str) -> Result<ForeignKeyRef, String> {
    let invalid = || format!("foreign key `{}` must be `table.column`", value);
    let (table, column) = value.trim().split_once('.').ok_or_else(invalid)?;
    let (table, column) = (table.trim(), column.trim());
    if table.is_empty() || column.is_empty() || column.contains('.') {
        return Err(invalid());
    }
    Ok(ForeignKeyRef {
        table: table.to_string(),
        column: column.to_string(),
    })
}

/// Structural checks on a CHECK expression. This is not a SQL parser: it
/// catches the common shapes that are certainly wrong.
pub fn validate_check_constraint(expr: &str) -> Result<(), String> {
    let e = expr.trim();
    if e.is_empty() {
        return Err("check constraint is empty".to_string());
    }
    if !parens_balanced(e) {
        return Err(format!("unbalanced parentheses in check `{}`", e));
    }

    if let Some(pos) = find_keyword_ci(e, "IN") {
        let rest = e[pos + 2..].trim_start();
        let inner = rest
            .strip_prefix('(')
            .and_then(|r| r.find(')').map(|end| &r[..end]))
            .ok_or_else(|| format!("IN in check `{}` must be followed by a (...) list", e))?;
        if inner.trim().is_empty() {
            return Err(format!("IN list in check `{}` is empty", e));
        }
        for item in split_outside_quotes(inner, ',') {
            let item = item.trim();
            if !(QUOTED_RE.is_match(item) || NUMERIC_RE.is_match(item)) {
                return Err(format!(
                    "IN list item `{}` in check `{}` is not a quoted or numeric literal",
                    item, e
                ));
            }
        }
    }

    if find_keyword_ci(e, "BETWEEN").is_some() && find_keyword_ci(e, "AND").is_none() {
        return Err(format!("BETWEEN in check `{}` is missing AND", e));
    }

    let is_length_check = LENGTH_FUNCTIONS.iter().any(|f| contains_ci(e, f));
    if is_length_check && !e.contains(['<', '>', '=']) {
        return Err(format!(
            "length check `{}` has no comparison operator",
            e
        ));
    }

    Ok(())
}

fn parens_balanced(s: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_quote = false;
    for c in s.chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_quote
}

fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
        } else if c == sep && !in_quote {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parse an `enum:a,b,c` value list: non-empty, unique, identifier-safe.
pub fn parse_enum_values(value: &str) -> Result<Vec<String>, String> {
    if value.trim().is_empty() {
        return Err("enum has no values".to_string());
    }
    let mut values: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim) {
        if item.is_empty() {
            return Err(format!("enum `{}` contains an empty value", value));
        }
        if !is_valid_identifier(item) {
            return Err(format!("enum value `{}` is not identifier-safe", item));
        }
        if values.iter().any(|v| v == item) {
            return Err(format!("enum value `{}` is repeated", item));
        }
        values.push(item.to_string());
    }
    Ok(values)
}

/// Leading letter or underscore, then letters, digits or underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Parse a table-level `name(col_a,col_b)` index declaration.
pub fn parse_index_spec(value: &str) -> Result<IndexSpec, String> {
    let v = value.trim();
    let pos = v
        .find('(')
        .filter(|_| v.ends_with(')'))
        .ok_or_else(|| format!("index `{}` must list its columns as name(col_a,col_b)", v))?;

    let name = v[..pos].trim();
    let columns: Vec<String> = v[pos + 1..v.len() - 1]
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        return Err(format!("index `{}` lists no columns", v));
    }
    if let Some(bad) = columns.iter().find(|c| !is_valid_identifier(c)) {
        return Err(format!("index `{}` names invalid column `{}`", v, bad));
    }
    if !name.is_empty() && !is_valid_identifier(name) {
        return Err(format!("invalid index name `{}`", name));
    }

    Ok(IndexSpec {
        name: (!name.is_empty()).then(|| name.to_string()),
        columns,
    })
}
