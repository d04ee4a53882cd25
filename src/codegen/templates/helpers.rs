//! Shared helpers for the built-in templates

use std::fmt::Write;

use crate::codegen::{RenderError, TemplatePayload, GENERATED_MARKER};
use crate::model::EntityMetadata;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Marker, package and timestamp lines
pub(crate) fn write_header(
    out: &mut String,
    payload: &TemplatePayload<'_>,
) -> Result<(), RenderError> {
    writeln!(out, "{}", GENERATED_MARKER)?;
    writeln!(out, "// Package: {}", payload.package)?;
    writeln!(out, "// Generated at: {}", payload.timestamp())?;
    writeln!(out)?;
    Ok(())
}

/// Rust string literal for `s`
pub(crate) fn str_lit(s: &str) -> String {
    format!("{:?}", s)
}

/// `&["a", "b"]`
pub(crate) fn str_slice<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<String> = items.into_iter().map(str_lit).collect();
    format!("&[{}]", parts.join(", "))
}

pub(crate) fn opt_str_lit(s: Option<&str>) -> String {
    match s {
        Some(v) => format!("Some({})", str_lit(v)),
        None => "None".to_string(),
    }
}

/// Identifier usable as a module or function name; keywords get `r#`.
pub(crate) fn ident(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Upper snake case constant name.
pub(crate) fn const_name(payload: &TemplatePayload<'_>, name: &str) -> Result<String, RenderError> {
    let snake = payload.helper("snake", name)?;
    let upper = snake.to_uppercase();
    if upper.starts_with(|c: char| c.is_ascii_digit()) {
        Ok(format!("_{}", upper))
    } else {
        Ok(upper)
    }
}

/// `id, name, email`
pub(crate) fn column_list(entity: &EntityMetadata) -> String {
    entity.column_names().collect::<Vec<_>>().join(", ")
}

/// `col = $n AND ...`, numbering from `start`
pub(crate) fn placeholders_eq(columns: &[&str], start: usize, joiner: &str) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c, start + i))
        .collect::<Vec<_>>()
        .join(joiner)
}
